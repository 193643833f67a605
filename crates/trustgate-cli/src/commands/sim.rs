use log::info;

use trustgate_core::hal::SimHal;
use trustgate_core::queue::FrameQueue;
use trustgate_core::runtime::{CycleOutcome, Runtime};

use super::build_frame;

pub struct SimConfig {
    pub count: u32,
    pub replay_at: Option<u32>,
    pub bitflip_at: Option<u32>,
    pub low_confidence_at: Option<u32>,
}

#[derive(Default)]
struct Tally {
    dispatched: u32,
    rejected: u32,
    gate_denied: u32,
}

/// Drive `count` synthetic cycles of the real-time loop against a
/// [`SimHal`], optionally injecting a replayed, bit-flipped, or
/// under-confidence frame at a given cycle to demonstrate each rejection
/// path (spec §8 scenarios 2-5).
pub fn run(cfg: SimConfig) {
    let queue = FrameQueue::new();
    let mut runtime = Runtime::new(SimHal::new());
    let mut tally = Tally::default();
    let mut last_frame = None;

    for i in 1..=cfg.count {
        let t_ms = i * 20;
        let intent_id = (i % 4) as u16; // cycles noop, brake, move, turn
        let frame = if cfg.replay_at == Some(i) && last_frame.is_some() {
            last_frame.unwrap()
        } else if cfg.low_confidence_at == Some(i) {
            build_frame(i, t_ms, intent_id, 0, 500)
        } else {
            build_frame(i, t_ms, intent_id, 32767, 500)
        };
        let mut frame = frame;
        if cfg.bitflip_at == Some(i) {
            frame[20] ^= 0x01;
        }

        last_frame = Some(frame);
        queue.push(frame);

        let outcome = runtime.run_once(&queue);
        match outcome {
            CycleOutcome::Idle => println!("cycle {i}: idle"),
            CycleOutcome::Rejected(reason) => {
                tally.rejected += 1;
                println!("cycle {i}: rejected ({reason})");
            }
            CycleOutcome::GateDenied => {
                tally.gate_denied += 1;
                println!("cycle {i}: gate denied");
            }
            CycleOutcome::Dispatched(action) => {
                tally.dispatched += 1;
                println!("cycle {i}: dispatched {action:?}");
            }
        }
    }

    info!(
        "sim complete: {} dispatched, {} rejected, {} gate-denied, {} watchdog strobes",
        tally.dispatched,
        tally.rejected,
        tally.gate_denied,
        runtime.hal().strobe_count()
    );
    println!(
        "\n{} dispatched, {} rejected, {} gate-denied, {} watchdog strobes, last_seq={}",
        tally.dispatched,
        tally.rejected,
        tally.gate_denied,
        runtime.hal().strobe_count(),
        runtime.last_seq()
    );
}
