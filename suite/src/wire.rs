/*!
    in-memory serial wire between the two nodes

    every byte written by either side is recorded in a transcript, in the order it was written
*/

use std::{
    cell::RefCell,
    collections::VecDeque,
    convert::Infallible,
    future::poll_fn,
    rc::Rc,
    task::{Poll, Waker},
    };
use embedded_io_async::{ErrorType, Read, Write};


/// end of the wire
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}
impl Side {
    pub fn peer(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// bytes in flight toward one side
#[derive(Default)]
struct Lane {
    bytes: VecDeque<u8>,
    waker: Option<Waker>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    to_front: Lane,
    to_back: Lane,
    transcript: Vec<(Side, u8)>,
}
impl Shared {
    /// lane read by the given side
    fn lane(&mut self, reader: Side) -> &mut Lane {
        match reader {
            Side::Front => &mut self.to_front,
            Side::Back => &mut self.to_back,
        }
    }
}

/// both directions of a serial link, shared by the ports and the test
#[derive(Clone, Default)]
pub struct Wire {
    shared: Rc<RefCell<Shared>>,
}
impl Wire {
    pub fn new() -> Self {Self::default()}
    /// port for the given side, only one should exist per side
    pub fn port(&self, side: Side) -> SimPort {
        SimPort {wire: self.clone(), side}
    }
    /// every byte written so far, with its writer
    pub fn transcript(&self) -> Vec<(Side, u8)> {
        self.shared.borrow().transcript.clone()
    }
    /// bytes written by the given side
    pub fn sent_by(&self, side: Side) -> Vec<u8> {
        self.shared.borrow().transcript.iter()
            .filter(|(writer, _)| *writer == side)
            .map(|&(_, byte)| byte)
            .collect()
    }
    /// forget the transcript, bytes in flight are kept
    pub fn clear(&self) {
        self.shared.borrow_mut().transcript.clear();
    }
    /// number of bytes waiting to be read by the given side
    pub fn pending(&self, reader: Side) -> usize {
        self.shared.borrow_mut().lane(reader).bytes.len()
    }
    /// deliver bytes to the given side as if its peer sent them, without recording them
    pub fn inject(&self, reader: Side, bytes: &[u8]) {
        let mut shared = self.shared.borrow_mut();
        let lane = shared.lane(reader);
        lane.bytes.extend(bytes);
        if let Some(waker) = lane.waker.take() {
            waker.wake();
        }
    }
    /// disconnect the given side's receiving end, its pending reads then report end of file
    pub fn hang_up(&self, reader: Side) {
        let mut shared = self.shared.borrow_mut();
        let lane = shared.lane(reader);
        lane.closed = true;
        if let Some(waker) = lane.waker.take() {
            waker.wake();
        }
    }
}

/// one end of a [Wire]
pub struct SimPort {
    wire: Wire,
    side: Side,
}
impl SimPort {
    pub fn side(&self) -> Side {self.side}
}
impl ErrorType for SimPort {
    type Error = Infallible;
}
impl Read for SimPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        poll_fn(|cx| {
            let mut shared = self.wire.shared.borrow_mut();
            let lane = shared.lane(self.side);
            if lane.bytes.is_empty() {
                if lane.closed {
                    return Poll::Ready(Ok(0));
                }
                lane.waker = Some(cx.waker().clone());
                return Poll::Pending;
            }
            let count = buf.len().min(lane.bytes.len());
            for (slot, byte) in buf.iter_mut().zip(lane.bytes.drain(.. count)) {
                *slot = byte;
            }
            Poll::Ready(Ok(count))
        }).await
    }
}
impl Write for SimPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        let mut shared = self.wire.shared.borrow_mut();
        let side = self.side;
        shared.transcript.extend(buf.iter().map(|&byte| (side, byte)));
        let lane = shared.lane(side.peer());
        lane.bytes.extend(buf);
        if let Some(waker) = lane.waker.take() {
            waker.wake();
        }
        Ok(buf.len())
    }
    async fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
