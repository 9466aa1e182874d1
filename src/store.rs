/*!
    credential store on a 24Cxx eeprom

    every operation is a whole bus transaction, checked step by step. The first step reporting an unexpected status aborts the operation: no further step is issued but the stop condition, and a [StoreError] naming the step is returned.
*/

use embedded_hal_async::delay::DelayNs;
use packbytes::{FromBytes, ToBytes, ByteArray};
use thiserror::Error;
use log::*;

use crate::{
    bus::{TwoWire, BusStatus, Direction},
    layout::{Register, Address},
    };


/// base device address of 24Cxx parts, the page bits are ored in
pub const DEVICE: u8 = 0xa0;
/// time the eeprom needs to commit a written byte, during which it does not answer
pub const WRITE_CYCLE_MS: u32 = 10;

/// step of a bus transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Start,
    DeviceWrite,
    Address,
    Data,
    RepeatedStart,
    DeviceRead,
    Receive,
}

/// a transaction step did not report the status it should
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("bus step {step:?} reported {observed:?} instead of {expected:?}")]
pub struct StoreError {
    pub step: Step,
    pub expected: BusStatus,
    pub observed: BusStatus,
}

/// byte store on an eeprom reached through a [TwoWire] bus
pub struct Eeprom<B, D> {
    bus: B,
    delay: D,
}

impl<B: TwoWire, D: DelayNs> Eeprom<B, D> {
    pub fn new(bus: B, delay: D) -> Self {
        Self {bus, delay}
    }
    pub fn bus(&self) -> &B {&self.bus}
    pub fn bus_mut(&mut self) -> &mut B {&mut self.bus}
    pub fn release(self) -> (B, D) {(self.bus, self.delay)}

    /// write one byte at the given address
    pub async fn write_byte(&mut self, address: Address, value: u8) -> Result<(), StoreError> {
        let result = self.write_transaction(address, value).await;
        self.bus.end();
        match result {
            Ok(()) => {
                self.delay.delay_ms(WRITE_CYCLE_MS).await;
                Ok(())
            },
            Err(err) => {
                warn!("eeprom write at {:#05x} failed: {}", address, err);
                Err(err)
            },
        }
    }
    /// read one byte at the given address
    pub async fn read_byte(&mut self, address: Address) -> Result<u8, StoreError> {
        let result = self.read_transaction(address).await;
        self.bus.end();
        if let Err(err) = &result {
            warn!("eeprom read at {:#05x} failed: {}", address, err);
        }
        result
    }

    /// read a whole register, one byte transaction at a time
    pub async fn read<T: FromBytes>(&mut self, register: Register<T>) -> Result<T, StoreError> {
        let mut bytes = T::Bytes::zeroed();
        for (offset, byte) in bytes.as_mut().iter_mut().enumerate() {
            *byte = self.read_byte(register.byte(offset)).await?;
        }
        Ok(T::from_be_bytes(bytes))
    }
    /// write a whole register, one byte transaction at a time
    pub async fn write<T: ToBytes + FromBytes>(&mut self, register: Register<T>, value: T) -> Result<(), StoreError> {
        let bytes = value.to_be_bytes();
        for (offset, &byte) in bytes.as_ref().iter().enumerate() {
            self.write_byte(register.byte(offset), byte).await?;
        }
        Ok(())
    }

    async fn write_transaction(&mut self, address: Address, value: u8) -> Result<(), StoreError> {
        expect(Step::Start, BusStatus::Start, self.bus.begin().await)?;
        expect(Step::DeviceWrite, BusStatus::AddressWriteAck,
            self.bus.write_byte(device(address, Direction::Write)).await)?;
        expect(Step::Address, BusStatus::DataWriteAck,
            self.bus.write_byte(address as u8).await)?;
        expect(Step::Data, BusStatus::DataWriteAck,
            self.bus.write_byte(value).await)?;
        Ok(())
    }
    async fn read_transaction(&mut self, address: Address) -> Result<u8, StoreError> {
        expect(Step::Start, BusStatus::Start, self.bus.begin().await)?;
        expect(Step::DeviceWrite, BusStatus::AddressWriteAck,
            self.bus.write_byte(device(address, Direction::Write)).await)?;
        expect(Step::Address, BusStatus::DataWriteAck,
            self.bus.write_byte(address as u8).await)?;
        expect(Step::RepeatedStart, BusStatus::RepeatedStart, self.bus.begin().await)?;
        expect(Step::DeviceRead, BusStatus::AddressReadAck,
            self.bus.write_byte(device(address, Direction::Read)).await)?;
        let value = self.bus.read_byte_nack().await;
        expect(Step::Receive, BusStatus::DataReadNack, self.bus.status())?;
        Ok(value)
    }
}

/// device address selecting the 256 bytes page holding `address`
pub fn device(address: Address, direction: Direction) -> u8 {
    DEVICE | ((address & 0x0700) >> 7) as u8 | direction as u8
}

fn expect(step: Step, expected: BusStatus, observed: BusStatus) -> Result<(), StoreError> {
    if observed == expected  {Ok(())}
    else {Err(StoreError {step, expected, observed})}
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bits_in_device_address() {
        assert_eq!(device(0x070, Direction::Write), 0xa0);
        assert_eq!(device(0x070, Direction::Read), 0xa1);
        assert_eq!(device(0x170, Direction::Write), 0xa2);
        assert_eq!(device(0x7ff, Direction::Read), 0xaf);
    }
}
