//! Basic pipeline walkthrough: craft one signed, encrypted MOVE frame,
//! push it through the queue, and run one real-time cycle against a
//! simulated HAL.
//!
//! Run: `cargo run --example basic`

use trustgate_core::config::{CHACHA_KEY, MAC_KEY, MAGIC_WORD};
use trustgate_core::crypto::{chacha20, siphash};
use trustgate_core::hal::SimHal;
use trustgate_core::queue::FrameQueue;
use trustgate_core::runtime::{CycleOutcome, Runtime};
use trustgate_core::wire::{ENCRYPTED_END, ENCRYPTED_START, MAC_COVERED_LEN, Packet};

fn signed_frame(seq: u32, intent_id: u16, conf_q15: u16, v0: i16) -> [u8; 64] {
    let mut aux = [0i16; 18];
    aux[0] = v0;
    let plaintext = Packet {
        magic: MAGIC_WORD,
        version: 1,
        model_id: 1,
        seq,
        t_ms: 0,
        intent_id,
        conf_q15,
        aux,
        mac: 0,
    };
    let mut raw = plaintext.to_bytes();
    chacha20::encrypt(&mut raw[ENCRYPTED_START..ENCRYPTED_END], &CHACHA_KEY, seq as u64, 0);
    let mac = siphash::siphash24(&raw[..MAC_COVERED_LEN], &MAC_KEY);
    raw[56..64].copy_from_slice(&mac.to_le_bytes());
    raw
}

fn main() {
    let queue = FrameQueue::new();
    // intent_id 2 == MOVE, confidence near 1.0, v0 = 500 -> 5.00 rad/s.
    queue.push(signed_frame(1, 2, 32767, 500));

    let mut runtime = Runtime::new(SimHal::new());
    match runtime.run_once(&queue) {
        CycleOutcome::Dispatched(action) => {
            println!("dispatched {action:?}");
            println!("watchdog strobes: {}", runtime.hal().strobe_count());
        }
        other => println!("unexpected outcome: {other:?}"),
    }
}
