use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::Database;
use crate::error::Result;
use crate::models::{
    FingerprintLink, NewRating, NewVote, Participant, ParticipantStatus, Rating,
    RatingAggregate, StatusChange, TransitionJob, TransitionOutcome, Vote,
};
use crate::repository::{
    experiment::ExperimentRepository, fingerprint::FingerprintRepository,
    participant::ParticipantRepository, rating::RatingRepository,
    transition::TransitionRepository, vote::VoteRepository,
};
use crate::services::TransitionPlan;

/// Persistence operations the contest services depend on.
///
/// `Database` is the production implementation; anything else (an
/// in-memory store in tests) must honour the same uniqueness and
/// atomicity guarantees described on each method.
#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Live (not soft-deleted) participants, oldest first.
    async fn list_participants(
        &self,
        status: Option<ParticipantStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Participant>>;

    async fn count_participants(&self, status: Option<ParticipantStatus>) -> Result<i64>;

    /// `NotFound` for unknown and soft-deleted ids.
    async fn find_participant(&self, id: Uuid) -> Result<Participant>;

    /// `ConstraintViolation` when the user already has a live application.
    async fn create_participant(
        &self,
        user_id: Uuid,
        application_data: &serde_json::Value,
    ) -> Result<Participant>;

    /// Compare-and-set on the status column, appending `change` to the history.
    async fn change_status(
        &self,
        id: Uuid,
        from: ParticipantStatus,
        to: ParticipantStatus,
        change: &StatusChange,
    ) -> Result<Participant>;

    async fn soft_delete_participant(&self, id: Uuid) -> Result<()>;

    /// At most one row per `(user, participant, week)`; later calls overwrite.
    /// `ConstraintViolation` unless the participant is live and in `this week`
    /// at write time.
    async fn upsert_vote(&self, vote: &NewVote) -> Result<Vote>;

    /// Same key and phase guard as votes; also refreshes the participant
    /// aggregate atomically.
    async fn upsert_rating(&self, rating: &NewRating) -> Result<(Rating, RatingAggregate)>;

    async fn find_transition_job(&self, week_start: NaiveDate) -> Result<Option<TransitionJob>>;

    async fn list_transition_jobs(&self, limit: i64) -> Result<Vec<TransitionJob>>;

    /// All-or-nothing. `None` when the week's marker already exists.
    /// The winner is re-selected among the live `this week` rows inside the
    /// same unit of work, so `plan.winner_id` is only the expectation.
    async fn apply_transition(&self, plan: &TransitionPlan) -> Result<Option<TransitionOutcome>>;

    /// First writer wins; returns the variant in effect.
    async fn get_or_assign_variant(
        &self,
        test_key: &str,
        identity: &str,
        variant: &str,
    ) -> Result<String>;

    async fn record_fingerprint(&self, fingerprint_id: &str, user_id: Uuid) -> Result<()>;

    async fn fingerprint_links(&self, fingerprint_id: &str) -> Result<Vec<FingerprintLink>>;
}

#[async_trait]
impl ContestStore for Database {
    async fn list_participants(
        &self,
        status: Option<ParticipantStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Participant>> {
        ParticipantRepository::new(self.pool())
            .list(status, limit, offset)
            .await
    }

    async fn count_participants(&self, status: Option<ParticipantStatus>) -> Result<i64> {
        ParticipantRepository::new(self.pool()).count(status).await
    }

    async fn find_participant(&self, id: Uuid) -> Result<Participant> {
        ParticipantRepository::new(self.pool()).find_by_id(id).await
    }

    async fn create_participant(
        &self,
        user_id: Uuid,
        application_data: &serde_json::Value,
    ) -> Result<Participant> {
        ParticipantRepository::new(self.pool())
            .create(user_id, application_data)
            .await
    }

    async fn change_status(
        &self,
        id: Uuid,
        from: ParticipantStatus,
        to: ParticipantStatus,
        change: &StatusChange,
    ) -> Result<Participant> {
        ParticipantRepository::new(self.pool())
            .change_status(id, from, to, change)
            .await
    }

    async fn soft_delete_participant(&self, id: Uuid) -> Result<()> {
        ParticipantRepository::new(self.pool()).soft_delete(id).await
    }

    async fn upsert_vote(&self, vote: &NewVote) -> Result<Vote> {
        VoteRepository::new(self.pool()).upsert(vote).await
    }

    async fn upsert_rating(&self, rating: &NewRating) -> Result<(Rating, RatingAggregate)> {
        RatingRepository::new(self.pool()).upsert(rating).await
    }

    async fn find_transition_job(&self, week_start: NaiveDate) -> Result<Option<TransitionJob>> {
        TransitionRepository::new(self.pool())
            .find_job(week_start)
            .await
    }

    async fn list_transition_jobs(&self, limit: i64) -> Result<Vec<TransitionJob>> {
        TransitionRepository::new(self.pool()).list_jobs(limit).await
    }

    async fn apply_transition(&self, plan: &TransitionPlan) -> Result<Option<TransitionOutcome>> {
        TransitionRepository::new(self.pool()).apply(plan).await
    }

    async fn get_or_assign_variant(
        &self,
        test_key: &str,
        identity: &str,
        variant: &str,
    ) -> Result<String> {
        ExperimentRepository::new(self.pool())
            .get_or_assign(test_key, identity, variant)
            .await
    }

    async fn record_fingerprint(&self, fingerprint_id: &str, user_id: Uuid) -> Result<()> {
        FingerprintRepository::new(self.pool())
            .record(fingerprint_id, user_id)
            .await
    }

    async fn fingerprint_links(&self, fingerprint_id: &str) -> Result<Vec<FingerprintLink>> {
        FingerprintRepository::new(self.pool())
            .links(fingerprint_id)
            .await
    }
}
