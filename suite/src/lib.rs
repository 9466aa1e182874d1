/*!
    simulation harness running both door nodes in one test process

    the nodes run unmodified over simulated peripherals. A simulation polls, in this order and once per round: the test script (usually driving the front node), the back node, then the timers. Each started timer ticks once per round, so tick counts observed by the nodes are exact.
*/

pub mod wire;
pub mod eeprom;
pub mod timer;
pub mod panel;
pub mod actuators;

use std::{
    convert::Infallible,
    time::Duration,
    };
use embassy_futures::{
    yield_now,
    join::join,
    select::{select, Either},
    };
use doorlink::{
    front::{Front, State},
    back::Back,
    link::{Link, LinkError},
    store::Eeprom,
    sequencer::Sequencer,
    timer::Ticks,
    config::{FrontConfig, BackConfig},
    host::TokioDelay,
    };

use crate::{
    wire::{Wire, SimPort, Side},
    eeprom::SimBus,
    timer::SimTimer,
    panel::{ScriptedKeypad, RecordingDisplay},
    actuators::Actuators,
    };


pub type SimFront = Front<SimPort, TokioDelay, ScriptedKeypad, RecordingDisplay, SimTimer>;
pub type SimBack = Back<SimPort, TokioDelay, SimBus, TokioDelay, Actuators, Actuators, SimTimer>;
pub type SimError = LinkError<Infallible>;

/// run a test on a fresh single threaded runtime, failing it if it takes too long
pub fn test<F: Future>(test: F) -> F::Output {
    let _ = env_logger::builder().is_test(true).try_init();
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create runtime")
        .block_on(async move {
            tokio::time::timeout(Duration::from_secs(10), test)
            .await.expect("aborted test because took too long")
        })
}

/// a tick counter private to the caller, so that parallel tests do not share counters
pub fn leak_ticks() -> &'static Ticks {
    Box::leak(Box::new(Ticks::new()))
}

/// back node and the simulated peripherals it owns
pub struct BackRig {
    pub node: SimBack,
    pub bus: SimBus,
    pub actuators: Actuators,
    pub timer: SimTimer,
}
impl BackRig {
    pub fn new(wire: &Wire, config: BackConfig) -> Self {
        let ticks = leak_ticks();
        let bus = SimBus::new();
        let actuators = Actuators::new(ticks);
        let timer = SimTimer::new();
        let node = Back::new(
            Link::new(wire.port(Side::Back), TokioDelay),
            Eeprom::new(bus.clone(), TokioDelay),
            actuators.clone(),
            actuators.clone(),
            Sequencer::new(timer.clone(), ticks, config.timing),
            config,
            );
        Self {node, bus, actuators, timer}
    }
}

/// both nodes connected by a simulated wire
pub struct Rig {
    pub front: SimFront,
    pub back: BackRig,
    pub wire: Wire,
    pub keypad: ScriptedKeypad,
    pub display: RecordingDisplay,
    pub front_timer: SimTimer,
}
impl Rig {
    /// default settings, except status messages are not held
    pub fn new() -> Self {
        Self::with_config(
            FrontConfig {message_hold: 0, .. Default::default()},
            BackConfig::default(),
            )
    }
    pub fn with_config(front: FrontConfig, back: BackConfig) -> Self {
        let wire = Wire::new();
        let keypad = ScriptedKeypad::new();
        let display = RecordingDisplay::new();
        let front_timer = SimTimer::new();
        let node = Front::new(
            Link::new(wire.port(Side::Front), TokioDelay),
            keypad.clone(),
            display.clone(),
            Sequencer::new(front_timer.clone(), leak_ticks(), front.timing),
            front,
            );
        let back = BackRig::new(&wire, back);
        Self {front: node, back, wire, keypad, display, front_timer}
    }
    /// boot both nodes at the same time
    pub async fn boot(&mut self) -> Result<(), SimError> {
        let (front, back) = join(self.front.boot(), self.back.node.boot()).await;
        front.and(back)
    }
    /// run `script` on the front node while the back node serves it, until both are idle
    pub async fn run<T>(&mut self, script: impl AsyncFnOnce(&mut SimFront) -> T) -> T {
        let timers = [self.front_timer.clone(), self.back.timer.clone()];
        simulate(&mut self.back.node, &timers, &self.wire, script(&mut self.front)).await
    }
    /// create the given credential through the keypad, leaving the front node in its menu
    pub async fn enroll(&mut self, code: &str) {
        for _ in 0 .. 2 {
            self.keypad.press(code);
            self.keypad.press("=");
        }
        self.run(async |front: &mut SimFront| {
            advance_until(front, |state| *state == State::Menu).await
        }).await;
    }
}

/**
    run `script` while `back` serves the wire and `timers` tick

    once `script` completes, the simulation goes on until the back node consumed everything sent to it and no timer runs anymore
*/
pub async fn simulate<F: Future>(back: &mut SimBack, timers: &[SimTimer], wire: &Wire, script: F) -> F::Output {
    let script = async {
        let output = script.await;
        settle(wire, timers).await;
        output
    };
    match select(script, select(serve(back), drive(timers))).await {
        Either::First(output) => output,
        Either::Second(Either::First(result)) => match result {
            Ok(never) => match never {},
            Err(err) => panic!("back node failed: {}", err),
        },
        Either::Second(Either::Second(never)) => match never {},
    }
}

/// advance the front node until its state satisfies `done`
pub async fn advance_until(front: &mut SimFront, done: impl Fn(&State) -> bool) -> State {
    for _ in 0 .. 64 {
        let state = *front.advance().await.expect("front node failed");
        if done(&state) {
            return state;
        }
    }
    panic!("front node stuck in {:?}", front.state());
}

async fn serve(back: &mut SimBack) -> Result<Infallible, SimError> {
    loop {
        back.serve().await?;
    }
}
async fn drive(timers: &[SimTimer]) -> Infallible {
    loop {
        for timer in timers {
            timer.step();
        }
        yield_now().await;
    }
}
async fn settle(wire: &Wire, timers: &[SimTimer]) {
    loop {
        yield_now().await;
        if wire.pending(Side::Back) == 0 && timers.iter().all(|timer| !timer.is_running()) {
            break;
        }
    }
}
