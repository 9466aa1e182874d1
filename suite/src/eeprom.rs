/*!
    simulated 24C16 eeprom behind a two-wire bus master

    the status register evolves like an AVR TWI peripheral talking to the part. Every step is logged, and any future step can be made to fail with a chosen status.
*/

use std::{
    cell::RefCell,
    rc::Rc,
    };
use doorlink::{
    bus::{TwoWire, BusStatus},
    layout::{Address, MEMORY_END},
    store::DEVICE,
    };


/// prescaler bits sharing the status register, readers must mask them out
const PRESCALER: u8 = 0b01;

/// step issued on the bus, as seen by the part
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    Start,
    Transmit(u8),
    Receive {ack: bool},
    Stop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Idle,
    Started,
    /// addressed for writing, next byte is the word address
    WordAddress,
    Writing,
    Reading,
    /// addressed but did not answer
    Rejected,
}

struct Chip {
    memory: Vec<u8>,
    present: bool,
    mode: Mode,
    page: Address,
    pointer: Address,
    status: u8,
    log: Vec<BusOp>,
    fault: Option<(usize, BusStatus)>,
}
impl Chip {
    /// record a step, return false if it must fail without effect
    fn step(&mut self, op: BusOp) -> bool {
        self.log.push(op);
        match self.fault {
            Some((0, status)) => {
                self.fault = None;
                self.status = u8::from(status);
                false
            },
            Some((countdown, status)) => {
                self.fault = Some((countdown - 1, status));
                true
            },
            None => true,
        }
    }
    fn advance_pointer(&mut self) {
        self.pointer = (self.pointer + 1) % MEMORY_END;
    }
}

/// handle on a simulated eeprom, clones share the same part
#[derive(Clone)]
pub struct SimBus {
    chip: Rc<RefCell<Chip>>,
}
impl SimBus {
    /// erased part, answering on the bus
    pub fn new() -> Self {
        Self {chip: Rc::new(RefCell::new(Chip {
            memory: vec![0xff; usize::from(MEMORY_END)],
            present: true,
            mode: Mode::Idle,
            page: 0,
            pointer: 0,
            status: u8::from(BusStatus::NoInfo),
            log: Vec::new(),
            fault: None,
        }))}
    }
    /// content of the part, bypassing the bus
    pub fn memory(&self, address: Address, len: usize) -> Vec<u8> {
        let start = usize::from(address);
        self.chip.borrow().memory[start .. start + len].to_vec()
    }
    /// program the part, bypassing the bus
    pub fn load(&self, address: Address, bytes: &[u8]) {
        let start = usize::from(address);
        self.chip.borrow_mut().memory[start .. start + bytes.len()].copy_from_slice(bytes);
    }
    /// steps issued since creation or the last [Self::clear_log]
    pub fn log(&self) -> Vec<BusOp> {
        self.chip.borrow().log.clone()
    }
    pub fn clear_log(&self) {
        self.chip.borrow_mut().log.clear();
    }
    /// a missing part never acknowledges its address
    pub fn set_present(&self, present: bool) {
        self.chip.borrow_mut().present = present;
    }
    /**
        make the step issued `index` steps from now report `status` and have no effect on the part

        stop conditions are not steps and are never faulted. The fault is used once.
    */
    pub fn fail_step(&self, index: usize, status: BusStatus) {
        self.chip.borrow_mut().fault = Some((index, status));
    }
}
impl Default for SimBus {
    fn default() -> Self {Self::new()}
}

impl TwoWire for SimBus {
    async fn start(&mut self) {
        let mut guard = self.chip.borrow_mut();
        let chip = &mut *guard;
        if !chip.step(BusOp::Start) {return}
        let status = match chip.mode {
            Mode::Idle => BusStatus::Start,
            _ => BusStatus::RepeatedStart,
        };
        chip.status = u8::from(status);
        chip.mode = Mode::Started;
    }
    async fn transmit(&mut self, byte: u8) {
        let mut guard = self.chip.borrow_mut();
        let chip = &mut *guard;
        if !chip.step(BusOp::Transmit(byte)) {return}
        let read = byte & 1 == 1;
        let status = match chip.mode {
            Mode::Started if chip.present && byte & 0xf0 == DEVICE => {
                chip.page = Address::from(byte & 0x0e) << 7;
                if read {
                    chip.pointer = chip.page | (chip.pointer & 0xff);
                    chip.mode = Mode::Reading;
                    BusStatus::AddressReadAck
                }
                else {
                    chip.mode = Mode::WordAddress;
                    BusStatus::AddressWriteAck
                }
            },
            Mode::Started => {
                chip.mode = Mode::Rejected;
                if read  {BusStatus::AddressReadNack}
                else  {BusStatus::AddressWriteNack}
            },
            Mode::WordAddress => {
                chip.pointer = chip.page | Address::from(byte);
                chip.mode = Mode::Writing;
                BusStatus::DataWriteAck
            },
            Mode::Writing => {
                chip.memory[usize::from(chip.pointer)] = byte;
                chip.advance_pointer();
                BusStatus::DataWriteAck
            },
            Mode::Idle | Mode::Reading | Mode::Rejected => BusStatus::DataWriteNack,
        };
        chip.status = u8::from(status);
    }
    async fn receive(&mut self, ack: bool) -> u8 {
        let mut guard = self.chip.borrow_mut();
        let chip = &mut *guard;
        if !chip.step(BusOp::Receive {ack}) {return 0xff}
        if chip.mode != Mode::Reading {
            chip.status = u8::from(BusStatus::BusError);
            return 0xff;
        }
        let value = chip.memory[usize::from(chip.pointer)];
        chip.advance_pointer();
        chip.status = u8::from(if ack {BusStatus::DataReadAck} else {BusStatus::DataReadNack});
        value
    }
    fn stop(&mut self) {
        let mut chip = self.chip.borrow_mut();
        chip.log.push(BusOp::Stop);
        chip.mode = Mode::Idle;
        chip.status = u8::from(BusStatus::NoInfo);
    }
    fn status_register(&self) -> u8 {
        self.chip.borrow().status | PRESCALER
    }
}
