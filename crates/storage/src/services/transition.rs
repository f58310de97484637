use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::contest_week::ContestWeek;
use crate::models::{Participant, ParticipantStatus, StatusChange, TransitionCounts};

pub const TRANSITION_REASON: &str = "weekly transition";

/// One bulk status reassignment of the weekly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStep {
    pub from: ParticipantStatus,
    pub to: ParticipantStatus,
}

/// Applied in this order so that no row is moved twice in a single run.
pub const TRANSITION_STEPS: [TransitionStep; 4] = [
    TransitionStep {
        from: ParticipantStatus::ThisWeek,
        to: ParticipantStatus::Past,
    },
    TransitionStep {
        from: ParticipantStatus::NextWeekOnSite,
        to: ParticipantStatus::ThisWeek,
    },
    TransitionStep {
        from: ParticipantStatus::NextWeek,
        to: ParticipantStatus::NextWeekOnSite,
    },
    TransitionStep {
        from: ParticipantStatus::PreNextWeek,
        to: ParticipantStatus::NextWeek,
    },
];

/// Everything a store needs to apply one weekly run atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub week: ContestWeek,
    /// Winner among the snapshot the plan was built from
    pub winner_id: Option<Uuid>,
    pub planned_at: DateTime<Utc>,
}

impl TransitionPlan {
    /// `outgoing` are the participants currently in `this week`; the winner
    /// is chosen among them.
    pub fn build(week: ContestWeek, outgoing: &[Participant], planned_at: DateTime<Utc>) -> Self {
        Self {
            week,
            winner_id: select_winner(outgoing).map(|p| p.participant_id),
            planned_at,
        }
    }

    pub fn steps(&self) -> &'static [TransitionStep] {
        &TRANSITION_STEPS
    }

    pub fn status_change(&self, step: &TransitionStep) -> StatusChange {
        StatusChange::new(step.from, step.to, self.planned_at).reason(TRANSITION_REASON)
    }

    /// Contest week assigned to rows entering `to`, if that phase carries one.
    pub fn week_for(&self, to: ParticipantStatus) -> Option<ContestWeek> {
        (to == ParticipantStatus::ThisWeek).then_some(self.week)
    }
}

impl TransitionCounts {
    pub fn record(&mut self, to: ParticipantStatus, moved: u64) {
        match to {
            ParticipantStatus::Past => self.moved_to_past += moved,
            ParticipantStatus::ThisWeek => self.moved_to_this_week += moved,
            ParticipantStatus::NextWeekOnSite => self.moved_to_next_week_on_site += moved,
            ParticipantStatus::NextWeek => self.moved_to_next_week += moved,
            ParticipantStatus::Pending
            | ParticipantStatus::PreNextWeek
            | ParticipantStatus::Rejected => {}
        }
    }
}

/// Highest average rating wins, then most votes, then the earliest entrant.
/// Nobody wins a week in which no candidate was rated.
pub fn select_winner(candidates: &[Participant]) -> Option<&Participant> {
    candidates
        .iter()
        .filter(|p| !p.is_deleted() && p.total_votes > 0)
        .max_by(|a, b| rank(a, b))
}

fn rank(a: &Participant, b: &Participant) -> Ordering {
    a.average_rating
        .cmp(&b.average_rating)
        .then_with(|| a.total_votes.cmp(&b.total_votes))
        .then_with(|| b.created_at.cmp(&a.created_at))
}
