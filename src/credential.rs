/*!
    the access code shared by both nodes

    a credential is exactly [CREDENTIAL_SIZE] decimal digits, kept as raw values `0..=9` (not ascii) both on the wire and in storage
*/

use thiserror::Error;


/// number of digits in a credential
pub const CREDENTIAL_SIZE: usize = 5;

/// 5 digits access code, can only be built from valid digits
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Credential {
    digits: [u8; CREDENTIAL_SIZE],
}

/// reason why some bytes cannot form a credential
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("expected 5 digits, got {0}")]
    Length(usize),
    #[error("value {value:#04x} at position {position} is not a decimal digit")]
    Digit {position: usize, value: u8},
}

impl Credential {
    /// digits in entry order
    pub fn digits(&self) -> &[u8; CREDENTIAL_SIZE] {&self.digits}
    /// raw storage representation
    pub fn to_bytes(self) -> [u8; CREDENTIAL_SIZE] {self.digits}
}

impl TryFrom<[u8; CREDENTIAL_SIZE]> for Credential {
    type Error = CredentialError;
    fn try_from(digits: [u8; CREDENTIAL_SIZE]) -> Result<Self, Self::Error> {
        if let Some(position) = digits.iter().position(|&value| value > 9) {
            return Err(CredentialError::Digit {position, value: digits[position]});
        }
        Ok(Self {digits})
    }
}
impl TryFrom<&[u8]> for Credential {
    type Error = CredentialError;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let digits = <[u8; CREDENTIAL_SIZE]>::try_from(value)
            .map_err(|_| CredentialError::Length(value.len()))?;
        Self::try_from(digits)
    }
}
impl TryFrom<&str> for Credential {
    type Error = CredentialError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut digits = [0; CREDENTIAL_SIZE];
        let mut count = 0;
        for (position, c) in value.chars().enumerate() {
            let digit = c.to_digit(10)
                .ok_or(CredentialError::Digit {position, value: u8::try_from(c).unwrap_or(u8::MAX)})?;
            if let Some(slot) = digits.get_mut(position) {
                *slot = digit as u8;
            }
            count += 1;
        }
        if count != CREDENTIAL_SIZE {
            return Err(CredentialError::Length(count));
        }
        Ok(Self {digits})
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text() {
        let credential = Credential::try_from("13579").unwrap();
        assert_eq!(credential.digits(), &[1, 3, 5, 7, 9]);
        assert_eq!(Credential::try_from("1357"), Err(CredentialError::Length(4)));
        assert_eq!(Credential::try_from("135799"), Err(CredentialError::Length(6)));
        assert_eq!(
            Credential::try_from("13a79"),
            Err(CredentialError::Digit {position: 2, value: b'a'}),
            );
    }

    #[test]
    fn reject_non_digit_bytes() {
        assert_eq!(
            Credential::try_from([1u8, 2, 10, 4, 5]),
            Err(CredentialError::Digit {position: 2, value: 10}),
            );
        // ascii is not accepted, digits travel as raw values
        assert!(Credential::try_from(*b"12345").is_err());
        assert_eq!(Credential::try_from(&[0u8, 0, 0][..]), Err(CredentialError::Length(3)));
    }
}
