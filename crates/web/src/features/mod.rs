pub mod fingerprints;
pub mod flags;
pub mod participants;
pub mod ratings;
pub mod transitions;
pub mod votes;
