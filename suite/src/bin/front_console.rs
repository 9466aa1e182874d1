/*!
    run the front node on a PC, against a back node attached to a serial port

    keys are typed on stdin (digits, `+` open, `-` change the code, `=` submit) and the display is printed on stdout

        front-console [serial port]
*/

use std::{
    collections::VecDeque,
    error::Error,
    io::Write as _,
    };
use futures_concurrency::future::Race;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use log::*;

use doorlink::{
    front::Front,
    link::Link,
    sequencer::Sequencer,
    timer::Ticks,
    peripherals::{Key, Keypad, Display},
    config::FrontConfig,
    host::{HostPort, TokioDelay, TokioTimer},
    };


const BAUD_RATE: u32 = 9600;
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

static TICKS: Ticks = Ticks::new();


/// keypad reading lines on stdin, one key per character
struct StdinKeypad {
    lines: Lines<BufReader<Stdin>>,
    pending: VecDeque<Key>,
}
impl StdinKeypad {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            pending: VecDeque::new(),
        }
    }
}
impl Keypad for StdinKeypad {
    async fn key(&mut self) -> Key {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return key;
            }
            match self.lines.next_line().await {
                Ok(Some(line)) => self.pending.extend(line.chars().map(Key::from)),
                Ok(None) => {
                    info!("stdin closed, no more keys");
                    std::future::pending::<()>().await;
                },
                Err(err) => {
                    error!("cannot read stdin: {}", err);
                    std::future::pending::<()>().await;
                },
            }
        }
    }
}

/// display printing each screen as two lines
struct StdoutDisplay;
impl Display for StdoutDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        print!("\n| {:<16} |\n| {:<16} |\n  ", top, bottom);
        let _ = std::io::stdout().flush();
    }
    fn mark(&mut self) {
        print!("*");
        let _ = std::io::stdout().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PORT.to_owned());
    info!("opening {} at {} bauds", path, BAUD_RATE);
    let port = HostPort::open(&path, BAUD_RATE)?;

    let config = FrontConfig::default();
    let mut front = Front::new(
        Link::new(port, TokioDelay),
        StdinKeypad::new(),
        StdoutDisplay,
        Sequencer::new(TokioTimer::default(), &TICKS, config.timing),
        config,
        );

    (
        async {
            match front.run().await {
                Ok(never) => match never {},
                Err(err) => Err::<(), Box<dyn Error>>(err.into()),
            }
        },
        async {
            tokio::signal::ctrl_c().await?;
            info!("interrupted");
            Ok::<(), Box<dyn Error>>(())
        },
    ).race().await
}
