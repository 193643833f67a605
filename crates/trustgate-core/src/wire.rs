//! Fixed 64-byte packet and 8-byte action wire layout.
//!
//! Layout (little-endian, no padding):
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | magic                         |
//! | 4      | 2    | version                       |
//! | 6      | 2    | model_id                      |
//! | 8      | 4    | seq                           |
//! | 12     | 4    | t_ms                          |
//! | 16     | 2    | intent_id   (encrypted start) |
//! | 18     | 2    | conf_q15                      |
//! | 20     | 36   | aux\[18\] (i16)               |
//! | 56     | 8    | mac         (encrypted end)   |

use crate::config::MAGIC_WORD;

/// Raw on-wire frame size.
pub const PACKET_LEN: usize = 64;
/// Offset where the encrypted region begins (`intent_id`).
pub const ENCRYPTED_START: usize = 16;
/// Offset where the encrypted region ends, exclusive (start of `mac`).
pub const ENCRYPTED_END: usize = 56;
/// Number of bytes covered by the MAC (everything but the MAC itself).
pub const MAC_COVERED_LEN: usize = 56;
/// Number of `aux` words.
pub const AUX_LEN: usize = 18;

/// A decoded 64-byte packet. Produced by [`Packet::parse`] from a raw frame
/// buffer; the encrypted fields are only meaningful after
/// [`crate::auth::Authenticator::try_admit`] has decrypted them in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub magic: u32,
    pub version: u16,
    pub model_id: u16,
    pub seq: u32,
    pub t_ms: u32,
    pub intent_id: u16,
    pub conf_q15: u16,
    pub aux: [i16; AUX_LEN],
    pub mac: u64,
}

impl Packet {
    /// Parse a 64-byte little-endian frame buffer into a `Packet`.
    ///
    /// Does not verify the MAC, magic word, or decrypt anything — this is a
    /// pure field-layout decode. Panics if `raw` is not exactly
    /// [`PACKET_LEN`] bytes; callers are expected to have already validated
    /// frame length at the SPI/queue boundary.
    pub fn parse(raw: &[u8; PACKET_LEN]) -> Self {
        Packet {
            magic: u32::from_le_bytes(raw[0..4].try_into().unwrap()),
            version: u16::from_le_bytes(raw[4..6].try_into().unwrap()),
            model_id: u16::from_le_bytes(raw[6..8].try_into().unwrap()),
            seq: u32::from_le_bytes(raw[8..12].try_into().unwrap()),
            t_ms: u32::from_le_bytes(raw[12..16].try_into().unwrap()),
            intent_id: u16::from_le_bytes(raw[16..18].try_into().unwrap()),
            conf_q15: u16::from_le_bytes(raw[18..20].try_into().unwrap()),
            aux: {
                let mut aux = [0i16; AUX_LEN];
                for (i, word) in aux.iter_mut().enumerate() {
                    let off = 20 + i * 2;
                    *word = i16::from_le_bytes(raw[off..off + 2].try_into().unwrap());
                }
                aux
            },
            mac: u64::from_le_bytes(raw[56..64].try_into().unwrap()),
        }
    }

    /// Re-encode into a 64-byte little-endian frame buffer.
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..8].copy_from_slice(&self.model_id.to_le_bytes());
        out[8..12].copy_from_slice(&self.seq.to_le_bytes());
        out[12..16].copy_from_slice(&self.t_ms.to_le_bytes());
        out[16..18].copy_from_slice(&self.intent_id.to_le_bytes());
        out[18..20].copy_from_slice(&self.conf_q15.to_le_bytes());
        for (i, word) in self.aux.iter().enumerate() {
            let off = 20 + i * 2;
            out[off..off + 2].copy_from_slice(&word.to_le_bytes());
        }
        out[56..64].copy_from_slice(&self.mac.to_le_bytes());
        out
    }

    /// Confidence as a float in `[0, 1]` (Q15: `conf_q15 / 32768.0`).
    pub fn confidence(&self) -> f32 {
        self.conf_q15 as f32 / 32768.0
    }

    /// Whether the plaintext magic word matches [`MAGIC_WORD`].
    pub fn has_valid_magic(&self) -> bool {
        self.magic == MAGIC_WORD
    }
}

/// Action tag, as carried in [`Action::act`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionKind {
    Noop = 0,
    Brake = 1,
    Move = 2,
    Turn = 3,
}

impl ActionKind {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ActionKind::Brake,
            2 => ActionKind::Move,
            3 => ActionKind::Turn,
            _ => ActionKind::Noop,
        }
    }
}

/// Candidate or accepted action: a tag plus a signed parameter whose
/// interpretation depends on the tag. Packed as 8 bytes on the wire
/// (`act: u8`, one pad byte, `v0: i16`, remainder implementation-defined
/// padding) — see spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub act: ActionKind,
    pub v0: i16,
}

impl Action {
    pub const NOOP: Action = Action {
        act: ActionKind::Noop,
        v0: 0,
    };

    pub fn brake(v0: i16) -> Self {
        Action {
            act: ActionKind::Brake,
            v0,
        }
    }

    pub fn mv(v0: i16) -> Self {
        Action {
            act: ActionKind::Move,
            v0,
        }
    }

    pub fn turn(v0: i16) -> Self {
        Action {
            act: ActionKind::Turn,
            v0,
        }
    }

    /// Pack into the 8-byte wire representation.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0] = self.act as u8;
        out[2..4].copy_from_slice(&self.v0.to_le_bytes());
        out
    }

    /// Unpack from the 8-byte wire representation.
    pub fn from_bytes(raw: [u8; 8]) -> Self {
        Action {
            act: ActionKind::from_u8(raw[0]),
            v0: i16::from_le_bytes([raw[2], raw[3]]),
        }
    }
}
