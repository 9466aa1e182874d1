use bilge::prelude::*;


/**
    single byte message exchanged between the two nodes

    values are fixed, both nodes are built against this same set. Any other byte decodes to [Opcode::Unknown]
*/
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// front node booted
    FrontReady = 0x01,
    /// back node is waiting for the next byte of a round
    BackReady = 0x02,
    /// opens a credential save round, 5 digits follow
    SaveCredential = 0x04,
    /// all digits of a save round were received and stored
    CredentialSaved = 0x05,
    /// opens a credential check round, 5 digits follow
    BeginCheck = 0x06,
    /// verdict: the digit just received differs from the stored one
    CredentialMismatch = 0x08,
    /// verdict: the digit just received equals the stored one
    CredentialMatches = 0x09,
    /// run the alarm sequence, no reply
    SoundAlarm = 0x11,
    /// run the door sequence, no reply
    UnlockDoor = 0x12,
    /// the front node is about to create a new credential, no reply
    ChangeCredential = 0x13,
    #[fallback]
    Unknown = 0xff,
}

impl Opcode {
    /// verdict opcode for a digit comparison
    pub fn verdict(matches: bool) -> Self {
        if matches {Self::CredentialMatches}
        else {Self::CredentialMismatch}
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_wire_values() {
        assert_eq!(Opcode::from(0x12u8), Opcode::UnlockDoor);
        assert_eq!(Opcode::from(0x06u8), Opcode::BeginCheck);
        assert_eq!(Opcode::from(0x13u8), Opcode::ChangeCredential);
        assert_eq!(u8::from(Opcode::CredentialMatches), 0x09);
        assert_eq!(u8::from(Opcode::SoundAlarm), 0x11);
    }

    #[test]
    fn unassigned_bytes_are_unknown() {
        for byte in [0x00u8, 0x03, 0x07, 0x10, 0x14, 0x42, 0xfe] {
            assert_eq!(Opcode::from(byte), Opcode::Unknown, "byte {byte:#04x}");
        }
    }
}
