use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use crate::features::{fingerprints, flags, participants, ratings, transitions, votes};

#[derive(OpenApi)]
#[openapi(
    paths(
        participants::handlers::list_participants,
        participants::handlers::get_participant,
        participants::handlers::submit_application,
        participants::handlers::approve_participant,
        participants::handlers::reject_participant,
        participants::handlers::delete_participant,
        votes::handlers::cast_vote,
        ratings::handlers::cast_rating,
        transitions::handlers::run_transition,
        transitions::handlers::preview_transition,
        transitions::handlers::list_transition_jobs,
        flags::handlers::list_flags,
        flags::handlers::get_flag,
        flags::handlers::assign_variant,
        fingerprints::handlers::record_fingerprint,
        fingerprints::handlers::linked_accounts,
    ),
    components(
        schemas(
            storage::dto::participant::SubmitApplicationRequest,
            storage::dto::participant::ModerationRequest,
            storage::dto::participant::ParticipantResponse,
            storage::dto::common::PaginationMeta,
            storage::dto::vote::CastVoteRequest,
            storage::dto::vote::VoteResponse,
            storage::dto::rating::CastRatingRequest,
            storage::dto::rating::RatingResponse,
            storage::dto::transition::TransitionRunStatus,
            storage::dto::transition::TransitionSummary,
            storage::dto::transition::TransitionJobResponse,
            storage::dto::fingerprint::FingerprintSignals,
            storage::dto::fingerprint::FingerprintResponse,
            storage::dto::fingerprint::LinkedAccountsResponse,
            storage::models::ParticipantStatus,
            storage::models::Vote,
            storage::models::Rating,
            storage::models::RatingAggregate,
            storage::models::TransitionCounts,
            flags::services::FlagEvaluation,
            flags::services::FlagsResponse,
            flags::services::VariantAssignment,
        )
    ),
    tags(
        (name = "participants", description = "Contest applications and public participant listing"),
        (name = "voting", description = "Weekly likes and star ratings"),
        (name = "flags", description = "Feature flags and A/B assignments"),
        (name = "fingerprints", description = "Device fingerprinting"),
        (name = "admin", description = "Moderation, fraud review and weekly transition"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/participants",
            "/api/participants/{id}/approve",
            "/api/votes",
            "/api/ratings",
            "/api/admin/transitions/run",
            "/api/experiments/{key}/assignment",
            "/api/admin/fingerprints/{fingerprint_id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
