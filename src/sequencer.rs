/*!
    timed actuation phases

    a sequence is a fixed list of phases. Each phase resets the tick origin then busy-waits until its target tick count is reached, blocking the whole node meanwhile. The timer is started fresh for each sequence and always stopped at its end.
*/

use log::*;

use crate::{
    config::Timing,
    timer::{Timer, TimerService, Ticks},
    };


/// one timed step of a sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// lock motor opening
    Unlocking,
    /// door held open
    Open,
    /// lock motor closing
    Locking,
    /// alarm sounding
    Alarm,
}

/// physical consequence of an authentication outcome
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sequence {
    /// successful authentication
    Unlock,
    /// too many wrong attempts
    Alarm,
}
impl Sequence {
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Self::Unlock => &[Phase::Unlocking, Phase::Open, Phase::Locking],
            Self::Alarm => &[Phase::Alarm],
        }
    }
}

pub struct Sequencer<S> {
    timer: Timer<S>,
    timing: Timing,
}
impl<S: TimerService> Sequencer<S> {
    pub fn new(service: S, ticks: &'static Ticks, timing: Timing) -> Self {
        Self {
            timer: Timer::new(service, ticks, timing.frequency),
            timing,
        }
    }
    pub fn timer(&self) -> &Timer<S> {&self.timer}
    pub fn timing(&self) -> &Timing {&self.timing}

    /**
        run all phases of a sequence to completion

        `enter` is called at the start of each phase, to drive the actuators or the display accordingly
    */
    pub async fn run(&mut self, sequence: Sequence, mut enter: impl FnMut(Phase)) {
        debug!("start sequence {:?}", sequence);
        self.timer.start();
        for &phase in sequence.phases() {
            let target = self.timing.ticks(phase);
            enter(phase);
            self.timer.reset_ticks();
            self.timer.wait(target).await;
            debug!("phase {:?} done after {} ticks", phase, self.timer.ticks_since_reset());
        }
        self.timer.stop();
    }
}
