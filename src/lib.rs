/*!
    door locker made of two nodes talking over a uart link

    - the front node owns the keypad and display, it authenticates the user and decides what happens
    - the back node owns the credential eeprom, the door motor and the buzzer, it stores and checks credentials and actuates

    both nodes share the wire opcodes in [opcode], the link rounds in [link] and the timed sequences in [sequencer]
*/
#![no_std]
#[cfg(feature = "std")]
extern crate std;

pub mod opcode;
pub mod credential;
pub mod layout;
pub mod bus;
pub mod store;
pub mod link;
pub mod timer;
pub mod sequencer;
pub mod peripherals;
pub mod config;

#[cfg(feature = "front")]
pub mod front;
#[cfg(feature = "back")]
pub mod back;
#[cfg(feature = "host")]
pub mod host;
