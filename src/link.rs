/*!
    byte protocol between the front and back nodes

    the wire carries single [Opcode] bytes and raw digits, without framing nor transport acknowledgment. Correctness only comes from the strict alternation of each round:

    - save round: `SaveCredential`, then 5 times (receive `BackReady`, send digit), then receive `CredentialSaved`
    - check round: `BeginCheck`, then 5 times (receive `BackReady`, send digit, receive a verdict)
    - commands: `UnlockDoor`, `SoundAlarm`, `ChangeCredential` are sent alone and never answered

    receiving blocks until a byte arrives, unless a timeout is set with [Link::with_timeout]
*/

use embedded_io_async::{Read, Write, ReadExactError};
use embedded_hal_async::delay::DelayNs;
use embassy_futures::select::{select, Either};
use thiserror::Error;
use log::*;

use crate::{
    opcode::Opcode,
    credential::{Credential, CREDENTIAL_SIZE},
    };


/// failure of the serial link
#[derive(Error, Debug)]
pub enum LinkError<E> {
    #[error("serial port failure: {0:?}")]
    Port(E),
    #[error("serial port closed")]
    Closed,
    #[error("no byte arrived in expected time")]
    Timeout,
}

/// one end of the serial link between the two nodes
pub struct Link<P, D> {
    port: P,
    delay: D,
    /// receive deadline in milliseconds, `None` waits forever
    timeout: Option<u32>,
}

impl<P: Read + Write, D: DelayNs> Link<P, D> {
    pub fn new(port: P, delay: D) -> Self {
        Self {port, delay, timeout: None}
    }
    /// give up a receive after the given number of milliseconds
    pub fn with_timeout(mut self, timeout: Option<u32>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn port(&self) -> &P {&self.port}
    pub fn port_mut(&mut self) -> &mut P {&mut self.port}

    /// transmit one raw byte
    pub async fn send_byte(&mut self, byte: u8) -> Result<(), LinkError<P::Error>> {
        self.port.write_all(&[byte]).await.map_err(LinkError::Port)?;
        self.port.flush().await.map_err(LinkError::Port)?;
        Ok(())
    }
    /// transmit one opcode
    pub async fn send(&mut self, opcode: Opcode) -> Result<(), LinkError<P::Error>> {
        trace!("send {:?}", opcode);
        self.send_byte(u8::from(opcode)).await
    }
    /// wait for one raw byte
    pub async fn receive_byte(&mut self) -> Result<u8, LinkError<P::Error>> {
        self.receive_byte_within(self.timeout).await
    }
    async fn receive_byte_within(&mut self, timeout: Option<u32>) -> Result<u8, LinkError<P::Error>> {
        let mut byte = [0u8];
        let received = match timeout {
            None => self.port.read_exact(&mut byte).await,
            Some(timeout) => match select(
                    self.port.read_exact(&mut byte),
                    self.delay.delay_ms(timeout),
                    ).await {
                Either::First(received) => received,
                Either::Second(()) => return Err(LinkError::Timeout),
            },
        };
        received.map_err(|err| match err {
            ReadExactError::UnexpectedEof => LinkError::Closed,
            ReadExactError::Other(err) => LinkError::Port(err),
            })?;
        Ok(byte[0])
    }
    /// wait for one opcode
    pub async fn receive(&mut self) -> Result<Opcode, LinkError<P::Error>> {
        let opcode = Opcode::from(self.receive_byte().await?);
        trace!("received {:?}", opcode);
        Ok(opcode)
    }
    /// wait until one of the wanted opcodes arrives, discarding anything else
    pub async fn expect(&mut self, wanted: &[Opcode]) -> Result<Opcode, LinkError<P::Error>> {
        self.expect_among(wanted, self.timeout).await
    }
    /// like [Self::expect], but give up after `timeout` milliseconds whatever the link's own timeout
    pub async fn expect_within(&mut self, wanted: &[Opcode], timeout: u32) -> Result<Opcode, LinkError<P::Error>> {
        self.expect_among(wanted, Some(timeout)).await
    }
    async fn expect_among(&mut self, wanted: &[Opcode], timeout: Option<u32>) -> Result<Opcode, LinkError<P::Error>> {
        loop {
            let opcode = Opcode::from(self.receive_byte_within(timeout).await?);
            if wanted.contains(&opcode) {
                trace!("received {:?}", opcode);
                return Ok(opcode);
            }
            warn!("discarding {:?} while waiting for {:?}", opcode, wanted);
        }
    }

    /**
        send a command that is never answered

        the peer gives no delivery confirmation, the command is only known to have left this node
    */
    pub async fn command(&mut self, opcode: Opcode) -> Result<(), LinkError<P::Error>> {
        debug!("command {:?}", opcode);
        self.send(opcode).await
    }

    /// initiator side of a save round, returns once the peer acknowledged storage
    pub async fn save_credential(&mut self, credential: &Credential) -> Result<(), LinkError<P::Error>> {
        debug!("save round");
        self.send(Opcode::SaveCredential).await?;
        for &digit in credential.digits() {
            self.expect(&[Opcode::BackReady]).await?;
            self.send_byte(digit).await?;
        }
        self.expect(&[Opcode::CredentialSaved]).await?;
        Ok(())
    }
    /**
        initiator side of a check round

        every digit is sent and answered even after a mismatch was reported, so the round always ends at the same point of the protocol. Returns the number of mismatching digits, 0 is the only correct outcome.
    */
    pub async fn check_credential(&mut self, credential: &Credential) -> Result<u8, LinkError<P::Error>> {
        debug!("check round");
        self.send(Opcode::BeginCheck).await?;
        let mut wrong = 0;
        for &digit in credential.digits() {
            self.expect(&[Opcode::BackReady]).await?;
            self.send_byte(digit).await?;
            let verdict = self.expect(&[Opcode::CredentialMatches, Opcode::CredentialMismatch]).await?;
            if verdict == Opcode::CredentialMismatch {
                wrong += 1;
            }
        }
        debug!("check round done, {} wrong digits", wrong);
        Ok(wrong)
    }

    /// responder side of a digit transfer: announce readiness then receive the digit
    pub async fn request_digit(&mut self) -> Result<u8, LinkError<P::Error>> {
        self.send(Opcode::BackReady).await?;
        self.receive_byte().await
    }
    /// responder side of a whole save round transfer, after its opening opcode
    pub async fn request_credential(&mut self) -> Result<[u8; CREDENTIAL_SIZE], LinkError<P::Error>> {
        let mut digits = [0; CREDENTIAL_SIZE];
        for digit in digits.iter_mut() {
            *digit = self.request_digit().await?;
        }
        Ok(digits)
    }
    /// wait for the given number of milliseconds, using the link's delay
    pub async fn pause(&mut self, milliseconds: u32) {
        if milliseconds != 0 {
            self.delay.delay_ms(milliseconds).await;
        }
    }
}
