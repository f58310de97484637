use chrono::{DateTime, Utc};
use storage::{
    ContestStore,
    dto::vote::{CastVoteRequest, VoteResponse},
    models::{NewVote, Participant},
    services::{ContestWeek, WeekClock},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::AuthUser;
use crate::rate_limit::RateLimiter;

/// Ensure the caller is under the limit for `action`
pub fn check_rate_limit(limiter: &RateLimiter, action: &str, user_id: Uuid) -> WebResult<()> {
    if limiter.allow(&format!("{}:{}", action, user_id)) {
        Ok(())
    } else {
        tracing::warn!(%user_id, action, "Rate limit exceeded");
        Err(WebError::TooManyRequests)
    }
}

/// Load a live participant and ensure it can receive votes this week
pub async fn votable_participant(
    store: &dyn ContestStore,
    participant_id: Uuid,
) -> WebResult<Participant> {
    let participant = store.find_participant(participant_id).await?;
    let status = participant.status()?;

    if !status.is_votable() {
        return Err(WebError::Conflict(format!(
            "Participant is '{}', only 'this week' participants can be voted on",
            status
        )));
    }

    Ok(participant)
}

/// Week a vote or rating on `participant` counts towards: the contest week
/// the transition assigned, or the clock's week when none was recorded.
pub fn voting_week(participant: &Participant, clock: &WeekClock, now: DateTime<Utc>) -> ContestWeek {
    participant
        .contest_week_start
        .map(ContestWeek::containing)
        .unwrap_or_else(|| clock.week_of(now))
}

/// Cast or replace the caller's vote for the participant's contest week
pub async fn cast_vote(
    store: &dyn ContestStore,
    limiter: &RateLimiter,
    clock: &WeekClock,
    user: &AuthUser,
    request: &CastVoteRequest,
    now: DateTime<Utc>,
) -> WebResult<VoteResponse> {
    check_rate_limit(limiter, "vote", user.id)?;
    let participant = votable_participant(store, request.participant_id).await?;

    let week = voting_week(&participant, clock, now);
    let vote = store
        .upsert_vote(&NewVote {
            user_id: user.id,
            participant_id: request.participant_id,
            week_start: week.start,
            value: request.value.into(),
        })
        .await?;

    tracing::debug!(
        user_id = %user.id,
        participant_id = %request.participant_id,
        value = vote.value,
        "Vote stored"
    );

    Ok(VoteResponse {
        vote,
        week_label: week.label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitConfig;
    use crate::testing::{MemoryStore, user};
    use axum::http::StatusCode;
    use std::time::Duration;
    use storage::{dto::vote::VoteValue, models::ParticipantStatus};

    fn limiter(max_requests: usize) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    fn request(participant_id: Uuid, value: VoteValue) -> CastVoteRequest {
        CastVoteRequest {
            participant_id,
            value,
        }
    }

    async fn like(
        store: &MemoryStore,
        limiter: &RateLimiter,
        caller: &AuthUser,
        target: Uuid,
    ) -> WebResult<VoteResponse> {
        cast_vote(
            store,
            limiter,
            &WeekClock::utc(),
            caller,
            &request(target, VoteValue::Like),
            Utc::now(),
        )
        .await
    }

    #[tokio::test]
    async fn test_repeated_vote_overwrites_single_row() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::ThisWeek);
        let limiter = limiter(10);
        let caller = user();
        let now = Utc::now();

        let first = cast_vote(
            &store,
            &limiter,
            &WeekClock::utc(),
            &caller,
            &request(target, VoteValue::Like),
            now,
        )
        .await
        .unwrap();
        let second = cast_vote(
            &store,
            &limiter,
            &WeekClock::utc(),
            &caller,
            &request(target, VoteValue::Dislike),
            now,
        )
        .await
        .unwrap();

        assert_eq!(first.vote.vote_id, second.vote.vote_id);
        let votes = store.votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, -1);
    }

    #[tokio::test]
    async fn test_votes_in_different_weeks_are_separate_rows() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::ThisWeek);
        let limiter = limiter(10);
        let caller = user();
        let now = Utc::now();

        for at in [now, now + chrono::TimeDelta::days(7)] {
            cast_vote(
                &store,
                &limiter,
                &WeekClock::utc(),
                &caller,
                &request(target, VoteValue::Like),
                at,
            )
            .await
            .unwrap();
        }

        assert_eq!(store.votes().len(), 2);
    }

    #[tokio::test]
    async fn test_votes_across_monday_before_the_transition_share_a_row() {
        use crate::features::transitions::services::run_weekly_transition;
        use chrono::{NaiveDate, TimeZone};

        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::NextWeekOnSite);
        let clock = WeekClock::utc();
        let limiter = limiter(10);
        let caller = user();

        let promoted_at = Utc.with_ymd_and_hms(2026, 10, 12, 0, 5, 0).unwrap();
        run_weekly_transition(&store, &clock, promoted_at).await.unwrap();

        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2026, 10, 19, 0, 1, 0).unwrap();
        let mut labels = Vec::new();
        for (at, value) in [(sunday, VoteValue::Like), (monday, VoteValue::Dislike)] {
            let response = cast_vote(&store, &limiter, &clock, &caller, &request(target, value), at)
                .await
                .unwrap();
            labels.push(response.week_label);
        }

        assert_eq!(labels, ["2026-W42", "2026-W42"]);
        let votes = store.votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].week_start, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert_eq!(votes[0].value, -1);
    }

    #[tokio::test]
    async fn test_store_rejects_vote_once_participant_left_this_week() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::Past);

        let err = store
            .upsert_vote(&NewVote {
                user_id: Uuid::new_v4(),
                participant_id: target,
                week_start: WeekClock::utc().week_of(Utc::now()).start,
                value: 1,
            })
            .await
            .unwrap_err();

        assert_eq!(WebError::from(err).status_code(), StatusCode::CONFLICT);
        assert!(store.votes().is_empty());
    }

    #[tokio::test]
    async fn test_vote_on_inactive_participant_conflicts() {
        let store = MemoryStore::default();
        let limiter = limiter(10);

        for status in [
            ParticipantStatus::Pending,
            ParticipantStatus::NextWeek,
            ParticipantStatus::NextWeekOnSite,
            ParticipantStatus::Past,
        ] {
            let target = store.insert(status);
            let err = cast_vote(
                &store,
                &limiter,
                &WeekClock::utc(),
                &user(),
                &request(target, VoteValue::Like),
                Utc::now(),
            )
            .await
            .unwrap_err();

            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
        assert!(store.votes().is_empty());
    }

    #[tokio::test]
    async fn test_vote_on_missing_participant_is_not_found() {
        let store = MemoryStore::default();

        let err = cast_vote(
            &store,
            &limiter(10),
            &WeekClock::utc(),
            &user(),
            &request(Uuid::new_v4(), VoteValue::Like),
            Utc::now(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit_applies_per_user() {
        let store = MemoryStore::default();
        let target = store.insert(ParticipantStatus::ThisWeek);
        let limiter = limiter(1);
        let (alice, bob) = (user(), user());

        assert!(like(&store, &limiter, &alice, target).await.is_ok());
        let err = like(&store, &limiter, &alice, target).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert!(like(&store, &limiter, &bob, target).await.is_ok());
    }
}
