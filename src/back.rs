/*!
    back node: credential storage and actuation

    the back node never takes initiative, it serves the commands of the front node one at a time. Save and check rounds touch the eeprom, door and alarm commands run a timed sequence on the motor or buzzer without replying.
*/

use core::convert::Infallible;
use embedded_io_async::{Read, Write};
use embedded_hal_async::delay::DelayNs;
use log::*;

use crate::{
    opcode::Opcode,
    credential::{Credential, CREDENTIAL_SIZE},
    layout::CREDENTIAL,
    bus::TwoWire,
    store::Eeprom,
    link::{Link, LinkError},
    sequencer::{Sequencer, Sequence, Phase},
    timer::TimerService,
    peripherals::{Motor, Buzzer, Rotation},
    config::BackConfig,
    };


pub struct Back<P, D, B, W, M, Z, S> {
    link: Link<P, D>,
    store: Eeprom<B, W>,
    motor: M,
    buzzer: Z,
    sequencer: Sequencer<S>,
    config: BackConfig,
}

impl<P, D, B, W, M, Z, S> Back<P, D, B, W, M, Z, S>
where
    P: Read + Write,
    D: DelayNs,
    B: TwoWire,
    W: DelayNs,
    M: Motor,
    Z: Buzzer,
    S: TimerService,
{
    pub fn new(link: Link<P, D>, store: Eeprom<B, W>, mut motor: M, mut buzzer: Z, sequencer: Sequencer<S>, config: BackConfig) -> Self {
        motor.drive(Rotation::Stop, 0);
        buzzer.set(false);
        Self {link, store, motor, buzzer, sequencer, config}
    }
    pub fn link(&self) -> &Link<P, D> {&self.link}
    pub fn store(&self) -> &Eeprom<B, W> {&self.store}
    pub fn store_mut(&mut self) -> &mut Eeprom<B, W> {&mut self.store}
    pub fn sequencer(&self) -> &Sequencer<S> {&self.sequencer}

    /// announce this node to the front node, nothing is waited for
    pub async fn boot(&mut self) -> Result<(), LinkError<P::Error>> {
        info!("back node ready");
        self.link.send(Opcode::BackReady).await
    }
    /// boot and serve commands forever, only returns on link failure
    pub async fn run(&mut self) -> Result<Infallible, LinkError<P::Error>> {
        self.boot().await?;
        loop {
            self.serve().await?;
        }
    }

    /// wait for one command and serve it to completion, returning it
    pub async fn serve(&mut self) -> Result<Opcode, LinkError<P::Error>> {
        let opcode = self.link.receive().await?;
        debug!("serving {:?}", opcode);
        match opcode {
            Opcode::SaveCredential => self.save().await?,
            Opcode::BeginCheck => self.check().await?,
            Opcode::UnlockDoor => self.actuate(Sequence::Unlock).await,
            Opcode::SoundAlarm => self.actuate(Sequence::Alarm).await,
            Opcode::FrontReady => info!("front node ready"),
            Opcode::ChangeCredential => info!("front node is changing the credential"),
            other => warn!("ignoring unexpected {:?}", other),
        }
        Ok(opcode)
    }

    /// responder side of a save round, the credential is only written once all its digits arrived
    async fn save(&mut self) -> Result<(), LinkError<P::Error>> {
        let digits = self.link.request_credential().await?;
        let credential = match Credential::try_from(digits) {
            Ok(credential) => credential,
            Err(err) => {
                error!("rejecting save round: {}", err);
                return Ok(());
            },
        };
        // the front node is told the round is over even if the eeprom failed
        match self.store.write(CREDENTIAL, credential.to_bytes()).await {
            Ok(()) => info!("credential stored"),
            Err(err) => error!("credential not stored: {}", err),
        }
        self.link.send(Opcode::CredentialSaved).await
    }
    /// responder side of a check round, one verdict per digit
    async fn check(&mut self) -> Result<(), LinkError<P::Error>> {
        for index in 0 .. CREDENTIAL_SIZE {
            let digit = self.link.request_digit().await?;
            let matches = match self.store.read_byte(CREDENTIAL.byte(index)).await {
                Ok(stored) => stored == digit,
                Err(err) => {
                    error!("cannot read stored digit {}: {}", index, err);
                    false
                },
            };
            self.link.send(Opcode::verdict(matches)).await?;
        }
        Ok(())
    }
    async fn actuate(&mut self, sequence: Sequence) {
        let duty = self.config.motor_duty;
        let motor = &mut self.motor;
        let buzzer = &mut self.buzzer;
        self.sequencer.run(sequence, |phase| match phase {
            Phase::Unlocking => motor.drive(Rotation::Clockwise, duty),
            Phase::Open => motor.drive(Rotation::Stop, 0),
            Phase::Locking => motor.drive(Rotation::AntiClockwise, duty),
            Phase::Alarm => buzzer.set(true),
        }).await;
        match sequence {
            Sequence::Unlock => motor.drive(Rotation::Stop, 0),
            Sequence::Alarm => buzzer.set(false),
        }
    }
}
