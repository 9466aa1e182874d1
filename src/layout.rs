/*!
    layout of the credential eeprom

    each stored value is described by a serializable data type and a constant of type [Register] defining its position in the eeprom
*/

use core::marker::PhantomData;
use packbytes::{FromBytes, ByteArray};
use crate::credential::CREDENTIAL_SIZE;


/**
    a register is a typed pointer in eeprom memory

    it only holds the address of the starting byte of the referenced value, hence can be created, copied or destroyed at no cost
*/
#[derive(PartialEq, Hash, Debug)]
pub struct Register<T> {
    addr: Address,
    ty: PhantomData<T>,
}
impl<T> Register<T> {
    /// create a register from its starting byte
    pub const fn new(address: Address) -> Self {
        Self{addr: address, ty: PhantomData}
    }
    /// starting byte in memory
    pub const fn address(&self) -> Address {self.addr}
}
impl<T: FromBytes> Register<T> {
    /// number of bytes occupied in memory
    pub const fn size(&self) -> Address {T::Bytes::SIZE as Address}
    /// address of the byte at the given offset in this register
    pub const fn byte(&self, offset: usize) -> Address {
        self.addr + offset as Address
    }
}
impl<T> Clone for Register<T> {
    fn clone(&self) -> Self {
        Self::new(self.address())
    }
}
impl<T> Copy for Register<T> {}


/// integer used for addressing eeprom memory, 24Cxx parts use 11 bits
pub type Address = u16;

/// highest address reachable on a 24C16
pub const MEMORY_END: Address = 0x800;

/// current credential, one digit per byte in entry order
pub const CREDENTIAL: Register<[u8; CREDENTIAL_SIZE]> = Register::new(0x70);
