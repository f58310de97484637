use chrono::{DateTime, Utc};
use storage::{
    ContestStore,
    dto::transition::{TransitionJobResponse, TransitionRunStatus, TransitionSummary},
    models::{Participant, ParticipantStatus, TransitionCounts},
    services::{TransitionPlan, WeekClock},
};

use crate::error::{WebError, WebResult};

const MAX_JOB_HISTORY: i64 = 200;

/// Run the weekly status transition for the week containing `now`.
///
/// Safe to invoke repeatedly: once a week has been processed every further
/// call reports `already_completed` and changes nothing. The plan is applied
/// in a single store transaction, so a failure leaves no partial transition.
pub async fn run_weekly_transition(
    store: &dyn ContestStore,
    clock: &WeekClock,
    now: DateTime<Utc>,
) -> WebResult<TransitionSummary> {
    let week = clock.week_of(now);

    if let Some(job) = store.find_transition_job(week.start).await? {
        tracing::info!(week = %week.label(), "Weekly transition already completed");
        return Ok(TransitionSummary::already_completed(week, &job));
    }

    let plan = plan_for(store, clock, now).await?;

    let outcome = match store.apply_transition(&plan).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            // Another invocation claimed the week between our check and apply.
            tracing::info!(week = %week.label(), "Weekly transition claimed concurrently");
            let job = store
                .find_transition_job(week.start)
                .await?
                .ok_or_else(|| {
                    WebError::InternalServerError(format!(
                        "Transition marker for {} vanished",
                        week.label()
                    ))
                })?;
            return Ok(TransitionSummary::already_completed(week, &job));
        }
        Err(e) => {
            tracing::error!(week = %week.label(), "Weekly transition failed: {}", e);
            return Err(e.into());
        }
    };

    let counts = outcome.counts;
    tracing::info!(
        week = %week.label(),
        winner = ?outcome.winner_id,
        moved_to_past = counts.moved_to_past,
        moved_to_this_week = counts.moved_to_this_week,
        moved_to_next_week_on_site = counts.moved_to_next_week_on_site,
        moved_to_next_week = counts.moved_to_next_week,
        "Weekly transition completed"
    );

    Ok(TransitionSummary::new(
        TransitionRunStatus::Completed,
        week,
        outcome.winner_id,
        counts,
    ))
}

/// What a run at `now` would do, without mutating anything
pub async fn preview_weekly_transition(
    store: &dyn ContestStore,
    clock: &WeekClock,
    now: DateTime<Utc>,
) -> WebResult<TransitionSummary> {
    let week = clock.week_of(now);

    if let Some(job) = store.find_transition_job(week.start).await? {
        return Ok(TransitionSummary::already_completed(week, &job));
    }

    let plan = plan_for(store, clock, now).await?;

    let mut counts = TransitionCounts::default();
    for step in plan.steps() {
        let moving = store.count_participants(Some(step.from)).await?;
        counts.record(step.to, moving.max(0) as u64);
    }

    Ok(TransitionSummary::new(
        TransitionRunStatus::DryRun,
        week,
        plan.winner_id,
        counts,
    ))
}

pub async fn list_jobs(
    store: &dyn ContestStore,
    limit: i64,
) -> WebResult<Vec<TransitionJobResponse>> {
    if !(1..=MAX_JOB_HISTORY).contains(&limit) {
        return Err(WebError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_JOB_HISTORY
        )));
    }

    let jobs = store.list_transition_jobs(limit).await?;

    Ok(jobs.into_iter().map(TransitionJobResponse::from).collect())
}

async fn plan_for(
    store: &dyn ContestStore,
    clock: &WeekClock,
    now: DateTime<Utc>,
) -> WebResult<TransitionPlan> {
    let outgoing: Vec<Participant> = store
        .list_participants(Some(ParticipantStatus::ThisWeek), i64::MAX, 0)
        .await?;

    Ok(TransitionPlan::build(clock.week_of(now), &outgoing, now))
}
