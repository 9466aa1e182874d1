//! motor and buzzer recording their commands with the tick count they were given at

use std::{
    cell::RefCell,
    rc::Rc,
    };
use doorlink::{
    peripherals::{Motor, Buzzer, Rotation},
    timer::Ticks,
    };


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Actuation {
    Motor(Rotation, u8),
    Buzzer(bool),
}

/// both actuators of the back node, clones share the same history
#[derive(Clone)]
pub struct Actuators {
    ticks: &'static Ticks,
    events: Rc<RefCell<Vec<(u32, Actuation)>>>,
}
impl Actuators {
    /// stamp commands with the given counter, usually the back node's
    pub fn new(ticks: &'static Ticks) -> Self {
        Self {ticks, events: Rc::default()}
    }
    /// commands with their tick stamp, in order
    pub fn events(&self) -> Vec<(u32, Actuation)> {
        self.events.borrow().clone()
    }
    /// commands without their stamp
    pub fn actions(&self) -> Vec<Actuation> {
        self.events.borrow().iter().map(|&(_, action)| action).collect()
    }
    /// ticks elapsed between consecutive commands
    pub fn spans(&self) -> Vec<u32> {
        self.events.borrow().windows(2)
            .map(|pair| pair[1].0.wrapping_sub(pair[0].0))
            .collect()
    }
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
    fn record(&self, action: Actuation) {
        self.events.borrow_mut().push((self.ticks.count(), action));
    }
}
impl Motor for Actuators {
    fn drive(&mut self, rotation: Rotation, duty: u8) {
        self.record(Actuation::Motor(rotation, duty));
    }
}
impl Buzzer for Actuators {
    fn set(&mut self, on: bool) {
        self.record(Actuation::Buzzer(on));
    }
}
