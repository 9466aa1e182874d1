/*!
    simulated tick source

    a [SimTimer] ticks exactly once per simulation round while started, so sequences last a known number of rounds regardless of the host speed
*/

use std::{
    cell::Cell,
    rc::Rc,
    };
use doorlink::timer::{TimerService, Ticks};


#[derive(Default)]
struct State {
    ticks: Cell<Option<&'static Ticks>>,
    starts: Cell<usize>,
    stops: Cell<usize>,
}

/// handle on a simulated timer, clones share the same timer
#[derive(Clone, Default)]
pub struct SimTimer {
    state: Rc<State>,
}
impl SimTimer {
    pub fn new() -> Self {Self::default()}
    pub fn is_running(&self) -> bool {
        self.state.ticks.get().is_some()
    }
    /// number of times the timer was started
    pub fn starts(&self) -> usize {self.state.starts.get()}
    /// number of times the timer was stopped
    pub fn stops(&self) -> usize {self.state.stops.get()}
    /// deliver one interrupt if running
    pub fn step(&self) {
        if let Some(ticks) = self.state.ticks.get() {
            ticks.tick();
        }
    }
}
impl TimerService for SimTimer {
    fn start(&mut self, _frequency: u32, ticks: &'static Ticks) {
        self.state.ticks.set(Some(ticks));
        self.state.starts.set(self.state.starts.get() + 1);
    }
    fn stop(&mut self) {
        self.state.ticks.set(None);
        self.state.stops.set(self.state.stops.get() + 1);
    }
}
