//! The real-time main loop: pop a frame, authenticate it, run it through
//! the policy VM and safety gate, dispatch, close the PID loop, strobe the
//! watchdog. Strictly sequential, short-circuiting on the first failed
//! stage (spec §4.2, §5) — there is no preemption and nothing here ever
//! blocks once a frame has been dequeued.
//!
//! [`ingress_poll_once`] models the untrusted ingress domain: it drains
//! the SPI source, filters by command byte, and enqueues. It is the only
//! piece of this crate that is expected to run on a different thread (or
//! core) than [`Runtime::run_once`]; the design notes in spec §9 map
//! "disable all interrupts" onto "run the real-time loop on a dedicated,
//! unpreempted thread" for hosted targets.

use log::{debug, trace};

use crate::auth::{Authenticator, RejectReason};
use crate::config::{SPI_CMD_INTENT, SPI_FRAME_LEN};
use crate::hal::{Hal, SpiSource};
use crate::pid::MotorBank;
use crate::queue::{Frame, FrameQueue};
use crate::wire::Action;
use crate::{actuator, gate, policy, watchdog};

/// Outcome of processing a single dequeued frame, for observability in
/// tests and the CLI. Not part of the on-wire protocol — purely
/// informational (spec §7: no error surface to the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Queue was empty; nothing to do this tick.
    Idle,
    /// Discarded before reaching the gate.
    Rejected(RejectReason),
    /// Authenticated and fresh, but the gate vetoed the action.
    GateDenied,
    /// Authenticated, fresh, gate-approved, dispatched, PID closed, and the
    /// watchdog strobed — a fully successful cycle.
    Dispatched(Action),
}

/// Owns everything exclusive to the real-time domain: the replay window,
/// motor state, and the hardware handle. Never shared with ingress.
pub struct Runtime<H: Hal> {
    auth: Authenticator,
    motors: MotorBank,
    hal: H,
}

impl<H: Hal> Runtime<H> {
    pub fn new(mut hal: H) -> Self {
        let motors = MotorBank::new(&mut hal);
        Runtime {
            auth: Authenticator::new(),
            motors,
            hal,
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn last_seq(&self) -> u32 {
        self.auth.last_seq()
    }

    /// Pop one frame from `queue` and run the full pipeline on it.
    pub fn run_once(&mut self, queue: &FrameQueue) -> CycleOutcome {
        let Some(frame) = queue.pop() else {
            return CycleOutcome::Idle;
        };

        let packet = match self.auth.try_admit(&frame) {
            Ok(packet) => packet,
            Err(reason) => {
                debug!("frame discarded: {reason}");
                return CycleOutcome::Rejected(reason);
            }
        };

        let action = policy::decide(&packet);
        if !gate::allow(&action, &packet) {
            debug!("gate denied action for seq {}", packet.seq);
            return CycleOutcome::GateDenied;
        }

        actuator::dispatch(&action, &mut self.motors, &mut self.hal);
        let now = self.hal.now_ms();
        self.motors.run(now, &mut self.hal);
        watchdog::strobe(&mut self.hal);
        trace!("seq {} admitted and dispatched", packet.seq);

        CycleOutcome::Dispatched(action)
    }
}

/// Ingress-domain step: read one SPI frame (if any), admit it to the queue
/// only if `cmd == SPI_CMD_INTENT` and `len == SPI_FRAME_LEN`, and push it.
/// A full queue silently drops the frame — there is no backpressure to the
/// SPI link (spec §4.1).
pub fn ingress_poll_once(spi: &mut dyn SpiSource, queue: &FrameQueue) -> bool {
    let Some(read) = spi.read_frame() else {
        return false;
    };
    if read.cmd != SPI_CMD_INTENT || read.len as usize != SPI_FRAME_LEN {
        return false;
    }
    let frame: Frame = read.data;
    let admitted = queue.push(frame);
    if !admitted {
        debug!("ingress queue full, dropping frame");
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHACHA_KEY, MAC_KEY, MAGIC_WORD};
    use crate::crypto::{chacha20, siphash};
    use crate::hal::SimHal;
    use crate::wire::{ActionKind, ENCRYPTED_END, ENCRYPTED_START, MAC_COVERED_LEN, PACKET_LEN, Packet};

    fn build_frame(seq: u32, intent_id: u16, conf_q15: u16, aux0: i16) -> Frame {
        let mut aux = [0i16; 18];
        aux[0] = aux0;
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

    #[test]
    fn happy_path_move_dispatches_and_strobes() {
        let q = FrameQueue::new();
        q.push(build_frame(1, 2, 32767, 500));
        let mut rt = Runtime::new(SimHal::new());
        let outcome = rt.run_once(&q);
        match outcome {
            CycleOutcome::Dispatched(a) => {
                assert_eq!(a.act, ActionKind::Move);
                assert_eq!(a.v0, 500);
            }
            other => panic!("expected Dispatched, got {other:?}"),
        }
        assert_eq!(rt.hal().strobe_count(), 1);
    }

    #[test]
    fn replay_is_rejected_with_no_strobe() {
        let q = FrameQueue::new();
        let frame = build_frame(1, 2, 32767, 500);
        q.push(frame);
        q.push(frame);
        let mut rt = Runtime::new(SimHal::new());
        assert!(matches!(rt.run_once(&q), CycleOutcome::Dispatched(_)));
        let second = rt.run_once(&q);
        assert_eq!(second, CycleOutcome::Rejected(RejectReason::Replay));
        assert_eq!(rt.hal().strobe_count(), 1, "rejected frame must not strobe");
    }

    #[test]
    fn bit_flip_is_rejected_at_mac_stage() {
        let q = FrameQueue::new();
        let mut frame = build_frame(1, 2, 32767, 500);
        frame[20] ^= 0x01;
        q.push(frame);
        let mut rt = Runtime::new(SimHal::new());
        assert_eq!(
            rt.run_once(&q),
            CycleOutcome::Rejected(RejectReason::MacFail)
        );
        assert_eq!(rt.hal().strobe_count(), 0);
    }

    #[test]
    fn out_of_order_sequence_advance_then_stale() {
        let q = FrameQueue::new();
        q.push(build_frame(5, 0, 32767, 0));
        q.push(build_frame(3, 0, 32767, 0));
        let mut rt = Runtime::new(SimHal::new());
        assert!(matches!(rt.run_once(&q), CycleOutcome::Dispatched(_)));
        assert_eq!(rt.last_seq(), 5);
        assert_eq!(
            rt.run_once(&q),
            CycleOutcome::Rejected(RejectReason::Replay)
        );
    }

    #[test]
    fn gate_veto_on_zero_confidence_blocks_actuation_and_strobe() {
        let q = FrameQueue::new();
        q.push(build_frame(1, 2, 0, 500));
        let mut rt = Runtime::new(SimHal::new());
        assert_eq!(rt.run_once(&q), CycleOutcome::GateDenied);
        assert_eq!(rt.hal().strobe_count(), 0);
        assert_eq!(rt.hal().pwm_duty(0), 0);
    }

    #[test]
    fn brake_asserts_gpio_and_preserves_motor_targets() {
        let q = FrameQueue::new();
        q.push(build_frame(1, 1, 32767, 1));
        let mut rt = Runtime::new(SimHal::new());
        let outcome = rt.run_once(&q);
        assert!(matches!(outcome, CycleOutcome::Dispatched(_)));
        assert_eq!(rt.hal().last_gpio(), Some((1, 1)));
        assert_eq!(rt.hal().strobe_count(), 1);
    }

    #[test]
    fn idle_queue_produces_idle_outcome_with_no_side_effects() {
        let q = FrameQueue::new();
        let mut rt = Runtime::new(SimHal::new());
        assert_eq!(rt.run_once(&q), CycleOutcome::Idle);
        assert_eq!(rt.hal().strobe_count(), 0);
    }

    struct FixedSpi {
        frames: Vec<(u8, u8, Frame)>,
        idx: usize,
    }

    impl SpiSource for FixedSpi {
        fn read_frame(&mut self) -> Option<crate::hal::SpiRead> {
            if self.idx >= self.frames.len() {
                return None;
            }
            let (cmd, len, data) = self.frames[self.idx];
            self.idx += 1;
            Some(crate::hal::SpiRead { cmd, len, data })
        }
    }

    #[test]
    fn ingress_filters_by_command_byte_and_length() {
        let q = FrameQueue::new();
        let mut spi = FixedSpi {
            frames: vec![
                (0x02, 64, [0u8; PACKET_LEN]), // wrong cmd
                (0x01, 10, [0u8; PACKET_LEN]), // wrong len
                (0x01, 64, [0u8; PACKET_LEN]), // admitted
            ],
            idx: 0,
        };
        assert!(!ingress_poll_once(&mut spi, &q));
        assert!(!ingress_poll_once(&mut spi, &q));
        assert!(ingress_poll_once(&mut spi, &q));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn ingress_drops_silently_when_queue_full() {
        let q = FrameQueue::new();
        let mut spi = FixedSpi {
            frames: (0..crate::config::QUEUE_CAPACITY + 2)
                .map(|i| (0x01u8, 64u8, build_frame(i as u32 + 1, 0, 0, 0)))
                .collect(),
            idx: 0,
        };
        let mut admitted = 0;
        for _ in 0..crate::config::QUEUE_CAPACITY + 2 {
            if ingress_poll_once(&mut spi, &q) {
                admitted += 1;
            }
        }
        assert_eq!(admitted, crate::config::QUEUE_CAPACITY);
        assert!(q.is_full());
    }
}
