pub mod common;
pub mod fingerprint;
pub mod participant;
pub mod rating;
pub mod transition;
pub mod vote;
