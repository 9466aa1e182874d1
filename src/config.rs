/*!
    tunable constants of both nodes

    defaults are the values the door hardware was specified with
*/

use crate::sequencer::Phase;


/// duration of each actuation phase, in timer ticks
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// tick frequency requested from the timer service, in Hz
    pub frequency: u32,
    /// motor opening the lock
    pub unlock: u32,
    /// door left open
    pub open: u32,
    /// motor closing the lock
    pub lock: u32,
    /// alarm after too many wrong attempts
    pub alarm: u32,
}
impl Timing {
    /// target tick count of a phase
    pub fn ticks(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Unlocking => self.unlock,
            Phase::Open => self.open,
            Phase::Locking => self.lock,
            Phase::Alarm => self.alarm,
        }
    }
}
impl Default for Timing {
    fn default() -> Self {
        Self {
            frequency: 1,
            unlock: 15,
            open: 3,
            lock: 15,
            alarm: 60,
        }
    }
}

/// settings of the front node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontConfig {
    /// wrong attempts allowed in a row before lockout
    pub max_attempts: u8,
    /// how long status messages stay on the display, in milliseconds
    pub message_hold: u32,
    /// give up waiting for the back node after this many milliseconds
    pub reply_timeout: Option<u32>,
    /// how long to wait for the back node's boot announcement, in milliseconds
    pub boot_window: u32,
    pub timing: Timing,
}
impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            message_hold: 1000,
            reply_timeout: None,
            boot_window: 500,
            timing: Timing::default(),
        }
    }
}

/// settings of the back node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BackConfig {
    /// motor pwm duty cycle while moving the lock, in percent
    pub motor_duty: u8,
    pub timing: Timing,
}
impl Default for BackConfig {
    fn default() -> Self {
        Self {
            motor_duty: 100,
            timing: Timing::default(),
        }
    }
}
