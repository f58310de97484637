pub mod fingerprint;
pub mod participant;
pub mod participant_status;
pub mod rating;
pub mod transition_job;
pub mod vote;

pub use fingerprint::FingerprintLink;
pub use participant::{Participant, StatusChange};
pub use participant_status::ParticipantStatus;
pub use rating::{NewRating, Rating, RatingAggregate};
pub use transition_job::{TransitionCounts, TransitionJob, TransitionOutcome};
pub use vote::{NewVote, Vote};
