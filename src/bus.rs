/*!
    two-wire bus transaction driver boundary

    the hardware side only has to issue conditions and move bytes, blocking until its interrupt flag reports completion. The status of each step is then read back from the status register, masked to its significant bits and decoded into [BusStatus].

    The driver never retries and never checks anything itself, this is left to [crate::store].
*/

use bilge::prelude::*;


/// bits of the status register carrying the bus state
pub const STATUS_MASK: u8 = 0xf8;

/// state reported by the bus peripheral after each step
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, Debug, PartialEq, Eq)]
pub enum BusStatus {
    /// illegal start or stop condition seen on the bus
    BusError = 0x00,
    /// start condition transmitted
    Start = 0x08,
    /// repeated start condition transmitted
    RepeatedStart = 0x10,
    /// device address with write bit transmitted, acknowledged
    AddressWriteAck = 0x18,
    /// device address with write bit transmitted, not acknowledged
    AddressWriteNack = 0x20,
    /// data byte transmitted, acknowledged
    DataWriteAck = 0x28,
    /// data byte transmitted, not acknowledged
    DataWriteNack = 0x30,
    /// another master took the bus
    ArbitrationLost = 0x38,
    /// device address with read bit transmitted, acknowledged
    AddressReadAck = 0x40,
    /// device address with read bit transmitted, not acknowledged
    AddressReadNack = 0x48,
    /// data byte received, acknowledge returned
    DataReadAck = 0x50,
    /// data byte received, no acknowledge returned
    DataReadNack = 0x58,
    /// no relevant state, the peripheral is idle or busy
    NoInfo = 0xf8,
    #[fallback]
    Unknown = 0xff,
}

/// direction bit appended to a device address
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/**
    a bus master able to run start/address/data/stop sequences

    implementors provide the raw steps, the checked steps used by [crate::store] are provided on top of them
*/
#[allow(async_fn_in_trait)]
pub trait TwoWire {
    /// issue a start (or repeated start) condition and wait for its completion
    async fn start(&mut self);
    /// transmit one byte and wait for its completion
    async fn transmit(&mut self, byte: u8);
    /// receive one byte, answering with an acknowledge or not, and wait for its completion
    async fn receive(&mut self, ack: bool) -> u8;
    /// issue a stop condition, without waiting for it
    fn stop(&mut self);
    /// raw content of the status register
    fn status_register(&self) -> u8;

    /// last bus status, masked to its significant bits
    fn status(&self) -> BusStatus {
        BusStatus::from(self.status_register() & STATUS_MASK)
    }
    /// start condition, returning the observed status
    async fn begin(&mut self) -> BusStatus {
        self.start().await;
        self.status()
    }
    /// send one byte, returning the observed status
    async fn write_byte(&mut self, byte: u8) -> BusStatus {
        self.transmit(byte).await;
        self.status()
    }
    /// receive one byte and acknowledge it, the status is left in [Self::status]
    async fn read_byte_ack(&mut self) -> u8 {
        self.receive(true).await
    }
    /// receive one byte without acknowledge, the status is left in [Self::status]
    async fn read_byte_nack(&mut self) -> u8 {
        self.receive(false).await
    }
    /// stop condition, fire and forget
    // TODO wait for stop completion on peripherals that report it
    fn end(&mut self) {
        self.stop()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_masked() {
        // prescaler bits live in the low bits of the register
        assert_eq!(BusStatus::from(0x0bu8 & STATUS_MASK), BusStatus::Start);
        assert_eq!(BusStatus::from(0x5au8 & STATUS_MASK), BusStatus::DataReadNack);
        assert_eq!(BusStatus::from(0x60u8 & STATUS_MASK), BusStatus::Unknown);
    }
}
