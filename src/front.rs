/*!
    front node: authentication state machine

    the front node owns the keypad and display. It forces a credential to be created at power up, then loops on the option menu: every option requires the credential, checked remotely by the back node, with a limited number of attempts before lockout.

    [Front::advance] performs exactly one state transition, [Front::run] chains them forever.
*/

use core::convert::Infallible;
use embedded_io_async::{Read, Write};
use embedded_hal_async::delay::DelayNs;
use log::*;

use crate::{
    opcode::Opcode,
    credential::{Credential, CREDENTIAL_SIZE},
    link::{Link, LinkError},
    sequencer::{Sequencer, Sequence, Phase},
    timer::TimerService,
    peripherals::{Key, Keypad, Display},
    config::FrontConfig,
    };


/// option chosen in the menu
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuOption {
    Open,
    ChangeCredential,
}

/// state of the authentication machine
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// creation: collecting the new credential
    EnteringFirst,
    /// creation: collecting the confirmation
    EnteringConfirm {first: Credential},
    /// creation: both entries matched, transferring to the back node
    Saving {credential: Credential},
    /// idle option menu
    Menu,
    /// verification: collecting an attempt, `remaining` attempts are left including this one
    EnteringAttempt {option: MenuOption, remaining: u8},
    /// verification: attempt sent to the back node for checking
    Verifying {option: MenuOption, remaining: u8, attempt: Credential},
    /// verified, door sequence running
    Unlocking,
    /// attempts exhausted, alarm sequence running
    Lockout,
}

pub struct Front<P, D, K, Y, S> {
    link: Link<P, D>,
    keypad: K,
    display: Y,
    sequencer: Sequencer<S>,
    config: FrontConfig,
    state: State,
}

impl<P, D, K, Y, S> Front<P, D, K, Y, S>
where
    P: Read + Write,
    D: DelayNs,
    K: Keypad,
    Y: Display,
    S: TimerService,
{
    pub fn new(link: Link<P, D>, keypad: K, display: Y, sequencer: Sequencer<S>, config: FrontConfig) -> Self {
        Self {
            link: link.with_timeout(config.reply_timeout),
            keypad,
            display,
            sequencer,
            config,
            state: State::EnteringFirst,
        }
    }
    pub fn state(&self) -> &State {&self.state}
    pub fn link(&self) -> &Link<P, D> {&self.link}
    pub fn display(&self) -> &Y {&self.display}
    pub fn sequencer(&self) -> &Sequencer<S> {&self.sequencer}

    /**
        announce this node to the back node

        the back node announces itself once at its own boot, that announcement is consumed here if it arrives within the boot window. Its absence is not an error: the back node may have booted long before.
    */
    pub async fn boot(&mut self) -> Result<(), LinkError<P::Error>> {
        info!("front node ready");
        self.link.send(Opcode::FrontReady).await?;
        match self.link.expect_within(&[Opcode::BackReady], self.config.boot_window).await {
            Ok(_) => info!("back node ready"),
            Err(LinkError::Timeout) => info!("no announcement from back node, assuming it is running"),
            Err(err) => return Err(err),
        }
        Ok(())
    }
    /// boot and serve the user forever, only returns on link failure
    pub async fn run(&mut self) -> Result<Infallible, LinkError<P::Error>> {
        self.boot().await?;
        loop {
            self.advance().await?;
        }
    }

    /// perform one transition and return the new state
    pub async fn advance(&mut self) -> Result<&State, LinkError<P::Error>> {
        let next = match self.state {
            State::EnteringFirst => {
                self.display.show("plz enter pass:", "");
                let first = self.enter_credential().await;
                State::EnteringConfirm {first}
            },
            State::EnteringConfirm {first} => {
                self.display.show("plz re-enter", "pass:");
                let confirm = self.enter_credential().await;
                if confirm == first {
                    State::Saving {credential: first}
                }
                else {
                    info!("confirmation differs, restart creation");
                    self.display.show("WRONG PASS", "TRY AGAIN!!!");
                    self.hold().await;
                    State::EnteringFirst
                }
            },
            State::Saving {credential} => {
                self.link.save_credential(&credential).await?;
                info!("new credential saved");
                self.display.show("Saved The Pass", "");
                self.hold().await;
                State::Menu
            },
            State::Menu => {
                self.display.show("+ : Open Door", "- : Change Pass");
                let option = self.choose_option().await;
                State::EnteringAttempt {option, remaining: self.config.max_attempts}
            },
            State::EnteringAttempt {option, remaining} => {
                self.display.show("plz enter pass:", "");
                let attempt = self.enter_credential().await;
                State::Verifying {option, remaining, attempt}
            },
            State::Verifying {option, remaining, attempt} => {
                let wrong = self.link.check_credential(&attempt).await?;
                if wrong == 0 {
                    info!("credential verified for {:?}", option);
                    self.display.show("Correct", "Password");
                    self.hold().await;
                    match option {
                        MenuOption::Open => State::Unlocking,
                        MenuOption::ChangeCredential => {
                            self.link.command(Opcode::ChangeCredential).await?;
                            State::EnteringFirst
                        },
                    }
                }
                else {
                    let remaining = remaining.saturating_sub(1);
                    warn!("wrong credential, {} attempts left", remaining);
                    self.display.show("Wrong Pass", "");
                    self.hold().await;
                    if remaining == 0  {State::Lockout}
                    else  {State::EnteringAttempt {option, remaining}}
                }
            },
            State::Unlocking => {
                self.link.command(Opcode::UnlockDoor).await?;
                let display = &mut self.display;
                self.sequencer.run(Sequence::Unlock, |phase| show_phase(&mut *display, phase)).await;
                self.display.show("Door is Locked", "");
                self.hold().await;
                State::Menu
            },
            State::Lockout => {
                error!("too many wrong attempts, sounding alarm");
                self.link.command(Opcode::SoundAlarm).await?;
                let display = &mut self.display;
                self.sequencer.run(Sequence::Alarm, |phase| show_phase(&mut *display, phase)).await;
                State::Menu
            },
        };
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(&self.state)
    }

    /// collect exactly 5 digits then wait for submit, other keys are ignored
    async fn enter_credential(&mut self) -> Credential {
        loop {
            let mut digits = heapless::Vec::<u8, CREDENTIAL_SIZE>::new();
            while !digits.is_full() {
                match self.keypad.key().await {
                    Key::Digit(digit) => {
                        if digits.push(digit).is_ok() {
                            self.display.mark();
                        }
                    },
                    other => trace!("ignored {:?} during entry", other),
                }
            }
            while self.keypad.key().await != Key::Submit {}

            match Credential::try_from(digits.as_slice()) {
                Ok(credential) => return credential,
                Err(err) => warn!("discarding entry: {}", err),
            }
        }
    }
    /// wait for one of the menu options, other keys are ignored
    async fn choose_option(&mut self) -> MenuOption {
        loop {
            match self.keypad.key().await {
                Key::Open => return MenuOption::Open,
                Key::ChangeCredential => return MenuOption::ChangeCredential,
                other => trace!("ignored {:?} in menu", other),
            }
        }
    }
    /// leave a status message on screen
    async fn hold(&mut self) {
        self.link.pause(self.config.message_hold).await;
    }
}

fn show_phase(display: &mut impl Display, phase: Phase) {
    match phase {
        Phase::Unlocking => display.show("Door is", "Unlocking"),
        Phase::Open => display.show("Door is open", ""),
        Phase::Locking => display.show("Door is Locking", ""),
        Phase::Alarm => display.show("ERROR! 3 times", "wait 60 sec"),
    }
}
