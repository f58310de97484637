use chrono::{DateTime, Utc};
use storage::{
    ContestStore,
    dto::rating::{CastRatingRequest, RatingResponse},
    models::NewRating,
    services::WeekClock,
};

use crate::error::WebResult;
use crate::features::votes::services::{check_rate_limit, votable_participant, voting_week};
use crate::middleware::auth::AuthUser;
use crate::rate_limit::RateLimiter;

/// Cast or replace the caller's star rating for the participant's contest week.
/// The request must already be validated.
pub async fn cast_rating(
    store: &dyn ContestStore,
    limiter: &RateLimiter,
    clock: &WeekClock,
    user: &AuthUser,
    request: &CastRatingRequest,
    now: DateTime<Utc>,
) -> WebResult<RatingResponse> {
    check_rate_limit(limiter, "rating", user.id)?;
    let participant = votable_participant(store, request.participant_id).await?;

    let week = voting_week(&participant, clock, now);
    let (rating, aggregate) = store
        .upsert_rating(&NewRating {
            user_id: user.id,
            participant_id: request.participant_id,
            week_start: week.start,
            stars: request.stars,
        })
        .await?;

    tracing::debug!(
        user_id = %user.id,
        participant_id = %request.participant_id,
        stars = rating.stars,
        average = %aggregate.average_rating,
        "Rating stored"
    );

    Ok(RatingResponse {
        rating,
        aggregate,
        week_label: week.label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitConfig;
    use crate::testing::{MemoryStore, user};
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::time::Duration;
    use storage::models::ParticipantStatus;
    use uuid::Uuid;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests: 100,
            window: Duration::from_secs(60),
        })
    }

    async fn rate(
        store: &MemoryStore,
        limiter: &RateLimiter,
        caller: &AuthUser,
        participant_id: Uuid,
        stars: i16,
    ) -> WebResult<RatingResponse> {
        cast_rating(
            store,
            limiter,
            &WeekClock::utc(),
            caller,
            &CastRatingRequest {
                participant_id,
                stars,
            },
            Utc::now(),
        )
        .await
    }

    #[tokio::test]
    async fn test_rating_requires_this_week_for_every_star_value() {
        let store = MemoryStore::default();
        let limiter = limiter();

        for status in [
            ParticipantStatus::Pending,
            ParticipantStatus::PreNextWeek,
            ParticipantStatus::NextWeek,
            ParticipantStatus::NextWeekOnSite,
            ParticipantStatus::Past,
            ParticipantStatus::Rejected,
        ] {
            let target = store.insert(status);
            for stars in 1..=5 {
                let err = rate(&store, &limiter, &user(), target, stars)
                    .await
                    .unwrap_err();
                assert_eq!(err.status_code(), StatusCode::CONFLICT);
            }
        }
    }

    #[tokio::test]
    async fn test_rerating_overwrites_and_refreshes_aggregate() {
        let store = MemoryStore::default();
        let limiter = limiter();
        let target = store.insert(ParticipantStatus::ThisWeek);
        let (alice, bob) = (user(), user());

        rate(&store, &limiter, &alice, target, 2).await.unwrap();
        rate(&store, &limiter, &bob, target, 5).await.unwrap();
        let response = rate(&store, &limiter, &alice, target, 4).await.unwrap();

        assert_eq!(response.aggregate.total_votes, 2);
        assert_eq!(
            response.aggregate.average_rating,
            Decimal::from_str("4.5").unwrap()
        );

        let participant = store.find_participant(target).await.unwrap();
        assert_eq!(participant.total_votes, 2);
        assert_eq!(
            participant.average_rating,
            Decimal::from_str("4.5").unwrap()
        );
    }

    #[tokio::test]
    async fn test_rating_is_rate_limited() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::ThisWeek);
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        });
        let caller = user();

        assert!(rate(&store, &limiter, &caller, target, 3).await.is_ok());
        assert!(rate(&store, &limiter, &caller, target, 4).await.is_ok());
        let err = rate(&store, &limiter, &caller, target, 5).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_store_rejects_rating_once_participant_left_this_week() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::NextWeekOnSite);

        let err = store
            .upsert_rating(&NewRating {
                user_id: Uuid::new_v4(),
                participant_id: target,
                week_start: WeekClock::utc().week_of(Utc::now()).start,
                stars: 5,
            })
            .await
            .unwrap_err();

        assert_eq!(
            crate::error::WebError::from(err).status_code(),
            StatusCode::CONFLICT
        );
        let participant = store.find_participant(target).await.unwrap();
        assert_eq!(participant.total_votes, 0);
    }
}
