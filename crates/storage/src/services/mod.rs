pub mod contest_week;
pub mod transition;

pub use contest_week::{ContestWeek, WeekClock};
pub use transition::{TRANSITION_STEPS, TransitionPlan, TransitionStep, select_winner};
