//! Frame authenticator: MAC verify, in-place payload decrypt, magic check,
//! replay check — in that fixed order, each failure short-circuiting with
//! no side effect (spec §4.2).

use crate::config::{CHACHA_KEY, MAC_KEY, MAGIC_WORD};
use crate::crypto::{chacha20, siphash};
use crate::wire::{ENCRYPTED_END, ENCRYPTED_START, MAC_COVERED_LEN, PACKET_LEN, Packet};

/// Why a frame was discarded. Purely observational (spec §7): nothing is
/// retried or surfaced to the host, this exists so callers/tests can tell
/// scenarios apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MacFail,
    MagicFail,
    Replay,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MacFail => write!(f, "mac-fail"),
            RejectReason::MagicFail => write!(f, "magic-fail"),
            RejectReason::Replay => write!(f, "replay"),
        }
    }
}

/// Holds the anti-replay high-water mark. Owned exclusively by the
/// real-time domain — never touched by ingress (spec §5).
pub struct Authenticator {
    last_seq: u32,
}

impl Authenticator {
    pub fn new() -> Self {
        Authenticator { last_seq: 0 }
    }

    /// Current replay high-water mark.
    pub fn last_seq(&self) -> u32 {
        self.last_seq
    }

    /// Run a raw frame through MAC verify → decrypt → magic check → replay
    /// check, in that order. On success, `last_seq` is advanced and the
    /// decoded, decrypted `Packet` is returned.
    pub fn try_admit(&mut self, frame: &[u8; PACKET_LEN]) -> Result<Packet, RejectReason> {
        let expected_mac = siphash::siphash24(&frame[..MAC_COVERED_LEN], &MAC_KEY);
        let wire_mac = u64::from_le_bytes(frame[56..64].try_into().unwrap());
        if expected_mac != wire_mac {
            return Err(RejectReason::MacFail);
        }

        let mut decrypted = *frame;
        let seq = u32::from_le_bytes(decrypted[8..12].try_into().unwrap());
        let nonce = seq as u64;
        chacha20::encrypt(
            &mut decrypted[ENCRYPTED_START..ENCRYPTED_END],
            &CHACHA_KEY,
            nonce,
            0,
        );

        let packet = Packet::parse(&decrypted);

        if packet.magic != MAGIC_WORD {
            return Err(RejectReason::MagicFail);
        }

        if packet.seq <= self.last_seq {
            return Err(RejectReason::Replay);
        }
        self.last_seq = packet.seq;

        Ok(packet)
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::siphash::siphash24;

    /// Build a valid, MAC'd, encrypted wire frame for the given plaintext
    /// fields — the test-side mirror of what the host would send.
    fn build_frame(seq: u32, intent_id: u16, conf_q15: u16, aux: [i16; 18]) -> [u8; PACKET_LEN] {
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
        chacha20::encrypt(
            &mut raw[ENCRYPTED_START..ENCRYPTED_END],
            &CHACHA_KEY,
            seq as u64,
            0,
        );
        let mac = siphash24(&raw[..MAC_COVERED_LEN], &MAC_KEY);
        raw[56..64].copy_from_slice(&mac.to_le_bytes());
        raw
    }

    #[test]
    fn happy_path_admits_and_decrypts() {
        let mut auth = Authenticator::new();
        let frame = build_frame(1, 2, 30000, [0i16; 18]);
        let p = auth.try_admit(&frame).expect("should admit");
        assert_eq!(p.seq, 1);
        assert_eq!(p.intent_id, 2);
        assert_eq!(p.conf_q15, 30000);
        assert_eq!(auth.last_seq(), 1);
    }

    #[test]
    fn replay_of_identical_frame_is_rejected() {
        let mut auth = Authenticator::new();
        let frame = build_frame(1, 2, 30000, [0i16; 18]);
        assert!(auth.try_admit(&frame).is_ok());
        assert_eq!(auth.try_admit(&frame), Err(RejectReason::Replay));
    }

    #[test]
    fn bit_flip_in_encrypted_region_fails_mac() {
        let mut auth = Authenticator::new();
        let mut frame = build_frame(1, 2, 30000, [0i16; 18]);
        frame[20] ^= 0x01; // aux[0] low byte
        assert_eq!(auth.try_admit(&frame), Err(RejectReason::MacFail));
    }

    #[test]
    fn out_of_order_sequence_advance_then_stale_is_rejected() {
        let mut auth = Authenticator::new();
        let first = build_frame(5, 2, 30000, [0i16; 18]);
        let second = build_frame(3, 2, 30000, [0i16; 18]);
        assert!(auth.try_admit(&first).is_ok());
        assert_eq!(auth.last_seq(), 5);
        assert_eq!(auth.try_admit(&second), Err(RejectReason::Replay));
        assert_eq!(auth.last_seq(), 5, "last_seq must not regress");
    }

    #[test]
    fn bad_magic_after_correct_mac_is_rejected_and_does_not_advance_last_seq() {
        let mut auth = Authenticator::new();
        // Build a frame whose plaintext magic is wrong but MAC is computed
        // over the resulting (still-valid) ciphertext, so it passes MAC.
        let mut raw = Packet {
            magic: 0xdead_beef,
            version: 1,
            model_id: 1,
            seq: 1,
            t_ms: 0,
            intent_id: 0,
            conf_q15: 0,
            aux: [0i16; 18],
            mac: 0,
        }
        .to_bytes();
        chacha20::encrypt(&mut raw[ENCRYPTED_START..ENCRYPTED_END], &CHACHA_KEY, 1, 0);
        let mac = siphash24(&raw[..MAC_COVERED_LEN], &MAC_KEY);
        raw[56..64].copy_from_slice(&mac.to_le_bytes());

        assert_eq!(auth.try_admit(&raw), Err(RejectReason::MagicFail));
        assert_eq!(auth.last_seq(), 0);
    }

    #[test]
    fn mac_failure_leaves_last_seq_untouched() {
        let mut auth = Authenticator::new();
        let mut frame = build_frame(10, 2, 30000, [0i16; 18]);
        frame[56] ^= 0xFF;
        assert_eq!(auth.try_admit(&frame), Err(RejectReason::MacFail));
        assert_eq!(auth.last_seq(), 0);
    }

    #[test]
    fn last_seq_tracks_maximum_admitted_sequence() {
        let mut auth = Authenticator::new();
        for seq in [1, 5, 3, 9, 2] {
            let frame = build_frame(seq, 0, 0, [0i16; 18]);
            let _ = auth.try_admit(&frame);
        }
        assert_eq!(auth.last_seq(), 9);
    }
}
