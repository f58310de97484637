use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Vote;

/// `1` for a like, `-1` for a dislike. Anything else fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum VoteValue {
    Like,
    Dislike,
}

impl TryFrom<i16> for VoteValue {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Like),
            -1 => Ok(Self::Dislike),
            other => Err(format!("vote value must be 1 or -1, got {}", other)),
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        match value {
            VoteValue::Like => 1,
            VoteValue::Dislike => -1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CastVoteRequest {
    pub participant_id: Uuid,
    #[schema(value_type = i16, example = 1)]
    pub value: VoteValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteResponse {
    pub vote: Vote,
    pub week_label: String,
}
