/*!
    run a node on a `std` host: serial port, delay and timer backed by tokio

    useful to drive real hardware from a PC, or to simulate a node in tests
*/

use std::{
    path::Path,
    time::Duration,
    };
use serial2_tokio::{SerialPort, CharSize, StopBits, Parity};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    task::JoinHandle,
    };
use embedded_hal_async::delay::DelayNs;
use thiserror::Error;

use crate::timer::{TimerService, Ticks};


/// serial port failure
#[derive(Error, Debug)]
#[error(transparent)]
pub struct PortError(#[from] std::io::Error);

impl embedded_io_async::Error for PortError {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        embedded_io_async::ErrorKind::Other
    }
}

/// uart link end on a host serial port
pub struct HostPort {
    port: SerialPort,
}
impl HostPort {
    /// open the given serial port file with the link's frame format: 8 data bits, no parity, one stop bit
    pub fn open(path: impl AsRef<Path>, rate: u32) -> Result<Self, std::io::Error> {
        let port = SerialPort::open(path, |mut settings: serial2_tokio::Settings| {
                settings.set_raw();
                settings.set_baud_rate(rate)?;
                settings.set_char_size(CharSize::Bits8);
                settings.set_stop_bits(StopBits::One);
                settings.set_parity(Parity::None);
                Ok(settings)
                })?;
        Ok(Self {port})
    }
}
impl embedded_io_async::ErrorType for HostPort {
    type Error = PortError;
}
impl embedded_io_async::Read for HostPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, PortError> {
        Ok(AsyncReadExt::read(&mut self.port, buf).await?)
    }
}
impl embedded_io_async::Write for HostPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, PortError> {
        Ok(AsyncWriteExt::write(&mut self.port, buf).await?)
    }
    async fn flush(&mut self) -> Result<(), PortError> {
        Ok(AsyncWriteExt::flush(&mut self.port).await?)
    }
}

/// delay backed by the tokio timer
#[derive(Copy, Clone, Debug, Default)]
pub struct TokioDelay;
impl DelayNs for TokioDelay {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(Duration::from_nanos(ns.into())).await
    }
}

/**
    periodic tick produced by a tokio task

    must be started from within a tokio runtime
*/
#[derive(Debug, Default)]
pub struct TokioTimer {
    task: Option<JoinHandle<()>>,
}
impl TimerService for TokioTimer {
    fn start(&mut self, frequency: u32, ticks: &'static Ticks) {
        self.stop();
        let period = Duration::from_secs(1) / frequency.max(1);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick of an interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                ticks.tick();
            }
        }));
    }
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
