/*!
    boundaries with the simple i/o drivers of each node

    these drivers hold no protocol state, the nodes only call them
*/


/// key read from the front node's keypad
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// numeric key, value `0..=9`
    Digit(u8),
    /// option: open the door
    Open,
    /// option: change the credential
    ChangeCredential,
    /// validates an entered credential
    Submit,
    /// any other key, ignored everywhere
    Other(char),
}
impl From<char> for Key {
    fn from(c: char) -> Self {
        match c {
            '0' ..= '9' => Self::Digit(c as u8 - b'0'),
            '+' => Self::Open,
            '-' => Self::ChangeCredential,
            '=' => Self::Submit,
            other => Self::Other(other),
        }
    }
}

/// keypad of the front node
#[allow(async_fn_in_trait)]
pub trait Keypad {
    /// wait for the next key press
    async fn key(&mut self) -> Key;
}

/// two lines character display of the front node
pub trait Display {
    /// clear the screen and show the given lines
    fn show(&mut self, top: &str, bottom: &str);
    /// append a masking character for one entered digit
    fn mark(&mut self);
}

/// rotation requested to the lock motor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    Stop,
    Clockwise,
    AntiClockwise,
}

/// lock motor of the back node
pub trait Motor {
    /// rotate with the given pwm duty cycle in percent
    fn drive(&mut self, rotation: Rotation, duty: u8);
}

/// alarm buzzer of the back node
pub trait Buzzer {
    fn set(&mut self, on: bool);
}
