/*!
    periodic tick shared between the timer interrupt and the main loop

    [Ticks] is the only data shared with interrupt context. It is written by the interrupt handler only, main-line code just reads it: resetting a [Timer] records an origin instead of clearing the counter.
*/

use core::sync::atomic::{AtomicU32, Ordering::*};
use embassy_futures::yield_now;


/// counter incremented once per timer interrupt
#[derive(Debug)]
pub struct Ticks {
    count: AtomicU32,
}
impl Ticks {
    pub const fn new() -> Self {
        Self {count: AtomicU32::new(0)}
    }
    /// to be called from the timer interrupt only
    pub fn tick(&self) {
        // single writer, a load/store pair is enough and works without atomic read-modify-write
        self.count.store(self.count.load(Relaxed).wrapping_add(1), Release);
    }
    /// number of ticks since boot, wrapping
    pub fn count(&self) -> u32 {
        self.count.load(Acquire)
    }
}
impl Default for Ticks {
    fn default() -> Self {Self::new()}
}

/**
    external timing service able to call [Ticks::tick] periodically

    prescaler and compare register arithmetic belongs to the implementor, only the frequency is chosen here
*/
pub trait TimerService {
    /// start periodic notifications at the given frequency in Hz, each one ticking `ticks`
    fn start(&mut self, frequency: u32, ticks: &'static Ticks);
    /// stop notifications
    fn stop(&mut self);
}

/// timer abstraction polled by the sequencer
pub struct Timer<S> {
    service: S,
    ticks: &'static Ticks,
    frequency: u32,
    origin: u32,
    running: bool,
}
impl<S: TimerService> Timer<S> {
    pub fn new(service: S, ticks: &'static Ticks, frequency: u32) -> Self {
        Self {service, ticks, frequency, origin: ticks.count(), running: false}
    }
    pub fn service(&self) -> &S {&self.service}
    pub fn is_running(&self) -> bool {self.running}

    /// start ticking from a fresh origin
    pub fn start(&mut self) {
        self.service.start(self.frequency, self.ticks);
        self.running = true;
        self.reset_ticks();
    }
    pub fn stop(&mut self) {
        self.service.stop();
        self.running = false;
    }
    /// ticks elapsed since the last reset
    pub fn ticks_since_reset(&self) -> u32 {
        self.ticks.count().wrapping_sub(self.origin)
    }
    pub fn reset_ticks(&mut self) {
        self.origin = self.ticks.count();
    }
    /// busy wait until `target` ticks elapsed since the last reset
    pub async fn wait(&self, target: u32) {
        while self.ticks_since_reset() < target {
            yield_now().await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    struct Manual;
    impl TimerService for Manual {
        fn start(&mut self, _frequency: u32, _ticks: &'static Ticks) {}
        fn stop(&mut self) {}
    }

    #[test]
    fn reset_does_not_touch_counter() {
        static TICKS: Ticks = Ticks::new();
        let mut timer = Timer::new(Manual, &TICKS, 1);
        timer.start();
        for _ in 0 .. 7 {TICKS.tick()}
        assert_eq!(timer.ticks_since_reset(), 7);
        timer.reset_ticks();
        assert_eq!(timer.ticks_since_reset(), 0);
        assert_eq!(TICKS.count(), 7);
        TICKS.tick();
        assert_eq!(timer.ticks_since_reset(), 1);
    }
}
