use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contest phase of a participant. Stored verbatim as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ParticipantStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "pre next week")]
    PreNextWeek,
    #[serde(rename = "next week")]
    NextWeek,
    #[serde(rename = "next week on site")]
    NextWeekOnSite,
    #[serde(rename = "this week")]
    ThisWeek,
    #[serde(rename = "past")]
    Past,
    #[serde(rename = "rejected")]
    Rejected,
}

impl ParticipantStatus {
    pub const ALL: [ParticipantStatus; 7] = [
        Self::Pending,
        Self::PreNextWeek,
        Self::NextWeek,
        Self::NextWeekOnSite,
        Self::ThisWeek,
        Self::Past,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PreNextWeek => "pre next week",
            Self::NextWeek => "next week",
            Self::NextWeekOnSite => "next week on site",
            Self::ThisWeek => "this week",
            Self::Past => "past",
            Self::Rejected => "rejected",
        }
    }

    /// Status the weekly transition moves this status to, if any.
    pub fn scheduled_successor(&self) -> Option<ParticipantStatus> {
        match self {
            Self::PreNextWeek => Some(Self::NextWeek),
            Self::NextWeek => Some(Self::NextWeekOnSite),
            Self::NextWeekOnSite => Some(Self::ThisWeek),
            Self::ThisWeek => Some(Self::Past),
            Self::Pending | Self::Past | Self::Rejected => None,
        }
    }

    /// Moderation edges an admin may apply by hand.
    pub fn admin_can_move_to(&self, target: ParticipantStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::PreNextWeek) | (Self::Pending, Self::Rejected)
        )
    }

    /// Votes and ratings are only accepted in this phase.
    pub fn is_votable(&self) -> bool {
        matches!(self, Self::ThisWeek)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown participant status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ParticipantStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
