//! Bring-up state machine

pub mod events;
pub mod machine;
pub mod survey;

pub use events::Event;
pub use machine::{BringUpState, FailCategory, FailReason};
pub use survey::{LevitationSurvey, Verdict};
