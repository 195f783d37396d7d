use std::fmt;

/// Which signals pause the session timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pause on focus loss and on system sleep.
    Strict,
    /// Keep counting through sleep and focus loss.
    Flaunt,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Flaunt => "flaunt",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Strict => "Timer will only keep the time you were active on Xcode",
            Mode::Flaunt => "Timer will not stop on Sleep and Wakeup of MacOS",
        }
    }

    /// Activation and deactivation of the editor move the timer.
    pub fn pauses_on_focus_loss(self) -> bool {
        matches!(self, Mode::Strict)
    }

    /// System sleep and wake move the timer.
    pub fn pauses_on_sleep(self) -> bool {
        !matches!(self, Mode::Flaunt)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
