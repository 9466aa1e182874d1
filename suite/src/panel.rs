//! keypad fed by the test and display recording what it is asked to show

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    };
use embassy_futures::yield_now;
use doorlink::peripherals::{Key, Keypad, Display};


/// keypad replaying the keys pressed by the test, clones share the same queue
#[derive(Clone, Default)]
pub struct ScriptedKeypad {
    keys: Rc<RefCell<VecDeque<Key>>>,
}
impl ScriptedKeypad {
    pub fn new() -> Self {Self::default()}
    /// queue one key press per character
    pub fn press(&self, keys: &str) {
        self.keys.borrow_mut().extend(keys.chars().map(Key::from));
    }
    /// keys not read yet
    pub fn remaining(&self) -> usize {
        self.keys.borrow().len()
    }
}
impl Keypad for ScriptedKeypad {
    async fn key(&mut self) -> Key {
        loop {
            let next = self.keys.borrow_mut().pop_front();
            match next {
                Some(key) => return key,
                None => yield_now().await,
            }
        }
    }
}

/// content of the display between two clears
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub top: String,
    pub bottom: String,
    /// masked digits appended
    pub marks: usize,
}

/// display keeping every screen shown, clones share the same history
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    screens: Rc<RefCell<Vec<Screen>>>,
}
impl RecordingDisplay {
    pub fn new() -> Self {Self::default()}
    pub fn screens(&self) -> Vec<Screen> {
        self.screens.borrow().clone()
    }
    /// top lines of all screens, in order
    pub fn tops(&self) -> Vec<String> {
        self.screens.borrow().iter().map(|screen| screen.top.clone()).collect()
    }
    pub fn last(&self) -> Option<Screen> {
        self.screens.borrow().last().cloned()
    }
    pub fn clear(&self) {
        self.screens.borrow_mut().clear();
    }
}
impl Display for RecordingDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        self.screens.borrow_mut().push(Screen {
            top: top.to_owned(),
            bottom: bottom.to_owned(),
            marks: 0,
        });
    }
    fn mark(&mut self) {
        let mut screens = self.screens.borrow_mut();
        match screens.last_mut() {
            Some(screen) => screen.marks += 1,
            None => screens.push(Screen {top: String::new(), bottom: String::new(), marks: 1}),
        }
    }
}
