//! In-memory store and fixtures shared by the unit and router tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use jsonwebtoken::{EncodingKey, Header};
use rust_decimal::Decimal;
use sqlx::types::Json;
use storage::{
    ContestStore,
    error::{Result, StorageError},
    models::{
        FingerprintLink, NewRating, NewVote, Participant, ParticipantStatus, Rating,
        RatingAggregate, StatusChange, TransitionCounts, TransitionJob, TransitionOutcome, Vote,
    },
    services::{TransitionPlan, WeekClock, select_winner},
};
use uuid::Uuid;

use crate::flags::FeatureFlags;
use crate::middleware::auth::{ADMIN_ROLE, ApiKeys, AppMetadata, AuthUser, Claims, JwtVerifier};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-with-at-least-32-bytes!!";
pub const TEST_AUDIENCE: &str = "authenticated";
pub const TEST_API_KEY: &str = "scheduler-key";

type EntryKey = (Uuid, Uuid, NaiveDate);

#[derive(Default)]
struct Inner {
    participants: Vec<Participant>,
    votes: BTreeMap<EntryKey, Vote>,
    ratings: BTreeMap<EntryKey, Rating>,
    jobs: BTreeMap<NaiveDate, TransitionJob>,
    assignments: HashMap<(String, String), String>,
    fingerprints: Vec<FingerprintLink>,
    fail_next_transition: bool,
    claim_before_next_apply: bool,
}

impl Inner {
    fn live(&self, id: Uuid) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| p.participant_id == id && !p.is_deleted())
            .ok_or(StorageError::NotFound)
    }

    fn live_mut(&mut self, id: Uuid) -> Result<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.participant_id == id && !p.is_deleted())
            .ok_or(StorageError::NotFound)
    }

    /// Mirrors the row lock taken by the Postgres upserts.
    fn votable(&self, id: Uuid) -> Result<()> {
        if self.live(id)?.status == ParticipantStatus::ThisWeek.as_str() {
            Ok(())
        } else {
            Err(StorageError::ConstraintViolation(format!(
                "Participant is no longer '{}'",
                ParticipantStatus::ThisWeek
            )))
        }
    }

    fn matching(&self, status: Option<ParticipantStatus>) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| {
            !p.is_deleted() && status.is_none_or(|s| p.status == s.as_str())
        })
    }
}

/// Behaves like the Postgres store for everything the services rely on.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Adds a live participant owned by a fresh user. Later inserts are
    /// strictly younger.
    pub fn insert(&self, status: ParticipantStatus) -> Uuid {
        let mut inner = self.lock();
        let created_at = Utc::now() + chrono::Duration::seconds(inner.participants.len() as i64);
        let participant = participant(Uuid::new_v4(), status, created_at);
        let id = participant.participant_id;
        inner.participants.push(participant);
        id
    }

    pub fn status_of(&self, id: Uuid) -> ParticipantStatus {
        self.lock().live(id).unwrap().status().unwrap()
    }

    pub fn set_rating(&self, id: Uuid, average_rating: Decimal, total_votes: i32) {
        let mut inner = self.lock();
        let participant = inner.live_mut(id).unwrap();
        participant.average_rating = average_rating;
        participant.total_votes = total_votes;
    }

    pub fn votes(&self) -> Vec<Vote> {
        self.lock().votes.values().cloned().collect()
    }

    pub fn applied_transitions(&self) -> usize {
        self.lock().jobs.len()
    }

    /// The next `apply_transition` fails after claiming the week, the way a
    /// dropped connection would abort the transaction.
    pub fn fail_next_transition(&self) {
        self.lock().fail_next_transition = true;
    }

    /// Another run claims the week between the caller's job lookup and its
    /// `apply_transition`.
    pub fn claim_before_next_apply(&self) {
        self.lock().claim_before_next_apply = true;
    }

    /// Status of a row whether or not it has been soft-deleted.
    pub fn raw_status(&self, id: Uuid) -> String {
        let inner = self.lock();
        let participant = inner.participants.iter().find(|p| p.participant_id == id);
        participant.unwrap().status.clone()
    }
}

fn participant(user_id: Uuid, status: ParticipantStatus, created_at: DateTime<Utc>) -> Participant {
    Participant {
        participant_id: Uuid::new_v4(),
        user_id,
        status: status.as_str().to_string(),
        application_data: serde_json::json!({ "full_name": "Test Participant" }),
        average_rating: Decimal::ZERO,
        total_votes: 0,
        contest_week_start: None,
        contest_week_end: None,
        is_winner: false,
        status_history: Json(Vec::new()),
        created_at,
        updated_at: created_at,
        deleted_at: None,
    }
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn list_participants(
        &self,
        status: Option<ParticipantStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Participant>> {
        let inner = self.lock();
        let mut rows: Vec<Participant> = inner.matching(status).cloned().collect();
        rows.sort_by_key(|p| p.created_at);

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_participants(&self, status: Option<ParticipantStatus>) -> Result<i64> {
        Ok(self.lock().matching(status).count() as i64)
    }

    async fn find_participant(&self, id: Uuid) -> Result<Participant> {
        self.lock().live(id).cloned()
    }

    async fn create_participant(
        &self,
        user_id: Uuid,
        application_data: &serde_json::Value,
    ) -> Result<Participant> {
        let mut inner = self.lock();

        let has_live_application = inner.participants.iter().any(|p| {
            p.user_id == user_id
                && !p.is_deleted()
                && !matches!(
                    p.status().ok(),
                    Some(ParticipantStatus::Past | ParticipantStatus::Rejected)
                )
        });
        if has_live_application {
            return Err(StorageError::ConstraintViolation(
                "An active application already exists".to_string(),
            ));
        }

        let mut created = participant(user_id, ParticipantStatus::Pending, Utc::now());
        created.application_data = application_data.clone();
        inner.participants.push(created.clone());

        Ok(created)
    }

    async fn change_status(
        &self,
        id: Uuid,
        from: ParticipantStatus,
        to: ParticipantStatus,
        change: &StatusChange,
    ) -> Result<Participant> {
        let mut inner = self.lock();
        let participant = inner.live_mut(id).map_err(|_| {
            StorageError::ConstraintViolation(format!("Participant is no longer '{}'", from))
        })?;

        if participant.status != from.as_str() {
            return Err(StorageError::ConstraintViolation(format!(
                "Participant is no longer '{}'",
                from
            )));
        }

        participant.status = to.as_str().to_string();
        participant.status_history.0.push(change.clone());
        participant.updated_at = change.changed_at;

        Ok(participant.clone())
    }

    async fn soft_delete_participant(&self, id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        let participant = inner.live_mut(id)?;
        participant.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn upsert_vote(&self, vote: &NewVote) -> Result<Vote> {
        let mut inner = self.lock();
        inner.votable(vote.participant_id)?;

        let now = Utc::now();
        let key = (vote.user_id, vote.participant_id, vote.week_start);
        let stored = inner
            .votes
            .entry(key)
            .and_modify(|existing| {
                existing.value = vote.value;
                existing.updated_at = now;
            })
            .or_insert_with(|| Vote {
                vote_id: Uuid::new_v4(),
                user_id: vote.user_id,
                participant_id: vote.participant_id,
                week_start: vote.week_start,
                value: vote.value,
                created_at: now,
                updated_at: now,
            });

        Ok(stored.clone())
    }

    async fn upsert_rating(&self, rating: &NewRating) -> Result<(Rating, RatingAggregate)> {
        let mut inner = self.lock();
        inner.votable(rating.participant_id)?;

        let now = Utc::now();
        let key = (rating.user_id, rating.participant_id, rating.week_start);
        let stored = inner
            .ratings
            .entry(key)
            .and_modify(|existing| {
                existing.stars = rating.stars;
                existing.updated_at = now;
            })
            .or_insert_with(|| Rating {
                rating_id: Uuid::new_v4(),
                user_id: rating.user_id,
                participant_id: rating.participant_id,
                week_start: rating.week_start,
                stars: rating.stars,
                created_at: now,
                updated_at: now,
            })
            .clone();

        let stars: Vec<i16> = inner
            .ratings
            .values()
            .filter(|r| r.participant_id == rating.participant_id)
            .map(|r| r.stars)
            .collect();
        let aggregate = RatingAggregate::from_stars(&stars);

        let participant = inner.live_mut(rating.participant_id)?;
        participant.average_rating = aggregate.average_rating;
        participant.total_votes = aggregate.total_votes;

        Ok((stored, aggregate))
    }

    async fn find_transition_job(&self, week_start: NaiveDate) -> Result<Option<TransitionJob>> {
        Ok(self.lock().jobs.get(&week_start).cloned())
    }

    async fn list_transition_jobs(&self, limit: i64) -> Result<Vec<TransitionJob>> {
        Ok(self
            .lock()
            .jobs
            .values()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn apply_transition(&self, plan: &TransitionPlan) -> Result<Option<TransitionOutcome>> {
        let mut inner = self.lock();

        if std::mem::take(&mut inner.claim_before_next_apply) {
            inner.jobs.insert(
                plan.week.start,
                TransitionJob {
                    week_start: plan.week.start,
                    week_end: plan.week.end,
                    winner_id: None,
                    counts: Json(TransitionCounts::default()),
                    started_at: plan.planned_at,
                    completed_at: Some(Utc::now()),
                },
            );
        }

        if inner.jobs.contains_key(&plan.week.start) {
            return Ok(None);
        }

        if std::mem::take(&mut inner.fail_next_transition) {
            return Err(StorageError::InvalidData(
                "connection reset during transition".to_string(),
            ));
        }

        // Work on a copy so the store is untouched unless every step lands.
        let mut participants = inner.participants.clone();
        let outgoing: Vec<Participant> = inner
            .matching(Some(ParticipantStatus::ThisWeek))
            .cloned()
            .collect();
        let winner_id = select_winner(&outgoing).map(|p| p.participant_id);
        let mut counts = TransitionCounts::default();

        for step in plan.steps() {
            let change = plan.status_change(step);
            let week = plan.week_for(step.to);
            let mut moved = 0;

            for p in participants
                .iter_mut()
                .filter(|p| !p.is_deleted() && p.status == step.from.as_str())
            {
                p.status = step.to.as_str().to_string();
                p.status_history.0.push(change.clone());
                p.updated_at = plan.planned_at;
                if let Some(week) = week {
                    p.contest_week_start = Some(week.start);
                    p.contest_week_end = Some(week.end);
                }
                moved += 1;
            }

            counts.record(step.to, moved);
        }

        if let Some(winner_id) = winner_id {
            if let Some(winner) = participants
                .iter_mut()
                .find(|p| p.participant_id == winner_id)
            {
                winner.is_winner = true;
            }
        }

        inner.participants = participants;
        inner.jobs.insert(
            plan.week.start,
            TransitionJob {
                week_start: plan.week.start,
                week_end: plan.week.end,
                winner_id,
                counts: Json(counts),
                started_at: plan.planned_at,
                completed_at: Some(Utc::now()),
            },
        );

        Ok(Some(TransitionOutcome { winner_id, counts }))
    }

    async fn get_or_assign_variant(
        &self,
        test_key: &str,
        identity: &str,
        variant: &str,
    ) -> Result<String> {
        Ok(self
            .lock()
            .assignments
            .entry((test_key.to_string(), identity.to_string()))
            .or_insert_with(|| variant.to_string())
            .clone())
    }

    async fn record_fingerprint(&self, fingerprint_id: &str, user_id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        let now = Utc::now();

        match inner
            .fingerprints
            .iter_mut()
            .find(|l| l.fingerprint_id == fingerprint_id && l.user_id == user_id)
        {
            Some(link) => link.last_seen = now,
            None => inner.fingerprints.push(FingerprintLink {
                fingerprint_id: fingerprint_id.to_string(),
                user_id,
                first_seen: now,
                last_seen: now,
            }),
        }

        Ok(())
    }

    async fn fingerprint_links(&self, fingerprint_id: &str) -> Result<Vec<FingerprintLink>> {
        Ok(self
            .lock()
            .fingerprints
            .iter()
            .filter(|l| l.fingerprint_id == fingerprint_id)
            .cloned()
            .collect())
    }
}

pub fn user() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: None,
        role: None,
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some("admin@example.com".to_string()),
        role: Some(ADMIN_ROLE.to_string()),
    }
}

/// Signed access token for `id`, valid for an hour.
pub fn token_for(id: Uuid, role: Option<&str>) -> String {
    let claims = Claims {
        sub: id,
        aud: TEST_AUDIENCE.to_string(),
        exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        email: None,
        role: Some("authenticated".to_string()),
        app_metadata: Some(AppMetadata {
            role: role.map(str::to_string),
        }),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn test_state(store: Arc<MemoryStore>, max_requests: usize) -> AppState {
    AppState {
        store,
        limiter: Arc::new(RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })),
        flags: Arc::new(FeatureFlags::builtin()),
        clock: WeekClock::utc(),
        api_keys: ApiKeys::from_comma_separated(TEST_API_KEY),
        jwt: JwtVerifier::new(TEST_SECRET, TEST_AUDIENCE),
        multi_account_threshold: 3,
    }
}
