//! Command interlocks
//!
//! Activation and levitation may each be commanded once per bring-up run.
//! If the controller still reports the condition that prompted the command
//! on a later poll, the run fails instead of commanding again.

/// One-shot gate for a hardware command
#[derive(Debug, Clone, Default)]
pub struct CommandInterlock {
    /// Times the gate was asked for, granted or not
    attempts: u8,
    /// Whether the single grant has been used
    spent: bool,
}

impl CommandInterlock {
    /// Create an unused interlock
    pub const fn new() -> Self {
        Self {
            attempts: 0,
            spent: false,
        }
    }

    /// Ask to issue the command
    ///
    /// Returns true the first time only.
    pub fn try_acquire(&mut self) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        if self.spent {
            return false;
        }
        self.spent = true;
        true
    }

    /// Number of times the gate was asked for
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Number of commands actually issued (0 or 1)
    pub fn issued(&self) -> u8 {
        self.spent as u8
    }
}
