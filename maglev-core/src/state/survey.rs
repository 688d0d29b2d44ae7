//! Levitation survey
//!
//! One pass over every registered mover during the levitation wait. Each
//! mover's state is classified as it is read; a blocked, disabled or
//! unexpected mover ends the pass with a fault straight away.

use heapless::Vec;

use super::machine::FailReason;
use crate::traits::{LevitationClass, MoverId, MoverState, MAX_MOVERS};

/// Outcome of a completed survey pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every surveyed mover is levitating
    AllLevitated,
    /// At least one mover is still lifting or landing; wait and re-read
    Transitioning,
    /// Some movers are on the ground and none are moving; levitation is needed
    NeedsLevitation,
}

/// Tally of one levitation pass
#[derive(Debug, Clone, Default)]
pub struct LevitationSurvey {
    surveyed: u8,
    grounded: u8,
    transitioning: u8,
    settled: Vec<MoverId, MAX_MOVERS>,
}

impl LevitationSurvey {
    /// Start an empty pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one mover's state
    ///
    /// Returns the fault that ends bring-up if the mover cannot levitate.
    pub fn record(&mut self, mover: MoverId, state: MoverState) -> Result<LevitationClass, FailReason> {
        let class = state.levitation();
        match class {
            LevitationClass::Grounded => self.grounded += 1,
            LevitationClass::Transitioning => self.transitioning += 1,
            LevitationClass::Settled => {
                // Idle and Stopped both float; remember who so the caller can log them
                let _ = self.settled.push(mover);
            }
            LevitationClass::Blocked => return Err(FailReason::BlockedState { mover, state }),
            LevitationClass::Disabled => return Err(FailReason::DisabledState { mover }),
            LevitationClass::Unexpected => return Err(FailReason::UnexpectedState { mover, state }),
        }
        self.surveyed += 1;
        Ok(class)
    }

    /// Number of movers recorded
    pub fn surveyed(&self) -> u8 {
        self.surveyed
    }

    /// Number of movers still on the ground
    pub fn grounded(&self) -> u8 {
        self.grounded
    }

    /// Movers seen floating at rest during this pass
    pub fn settled(&self) -> &[MoverId] {
        &self.settled
    }

    /// Verdict of the pass
    pub fn verdict(&self) -> Verdict {
        if self.transitioning > 0 {
            Verdict::Transitioning
        } else if self.grounded > 0 {
            Verdict::NeedsLevitation
        } else {
            Verdict::AllLevitated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> MoverId {
        MoverId::new(raw).unwrap()
    }

    #[test]
    fn test_empty_pass_is_levitated() {
        assert_eq!(LevitationSurvey::new().verdict(), Verdict::AllLevitated);
    }

    #[test]
    fn test_all_idle() {
        let mut survey = LevitationSurvey::new();
        survey.record(id(1), MoverState::Idle).unwrap();
        survey.record(id(2), MoverState::Stopped).unwrap();
        assert_eq!(survey.verdict(), Verdict::AllLevitated);
        assert_eq!(survey.settled(), &[id(1), id(2)]);
    }

    #[test]
    fn test_landed_needs_levitation() {
        let mut survey = LevitationSurvey::new();
        survey.record(id(1), MoverState::Idle).unwrap();
        survey.record(id(2), MoverState::Landed).unwrap();
        assert_eq!(survey.verdict(), Verdict::NeedsLevitation);
        assert_eq!(survey.grounded(), 1);
    }

    #[test]
    fn test_transition_wins_over_landed() {
        let mut survey = LevitationSurvey::new();
        survey.record(id(1), MoverState::Landed).unwrap();
        survey.record(id(2), MoverState::Discovering).unwrap();
        assert_eq!(survey.verdict(), Verdict::Transitioning);
    }

    #[test]
    fn test_fatal_states() {
        let mut survey = LevitationSurvey::new();
        assert_eq!(
            survey.record(id(4), MoverState::ObstacleDetected),
            Err(FailReason::BlockedState {
                mover: id(4),
                state: MoverState::ObstacleDetected
            })
        );
        assert_eq!(
            survey.record(id(5), MoverState::Disabled),
            Err(FailReason::DisabledState { mover: id(5) })
        );
        assert_eq!(
            survey.record(id(6), MoverState::Unrecognized(99)),
            Err(FailReason::UnexpectedState {
                mover: id(6),
                state: MoverState::Unrecognized(99)
            })
        );
        assert_eq!(survey.surveyed(), 0);
    }
}
