pub mod craft;
pub mod inspect;
pub mod sim;

use trustgate_core::config::{CHACHA_KEY, MAC_KEY, MAGIC_WORD};
use trustgate_core::crypto::{chacha20, siphash};
use trustgate_core::wire::{ENCRYPTED_END, ENCRYPTED_START, MAC_COVERED_LEN, PACKET_LEN, Packet};

/// Parse an `--intent` value shared by `craft` and `sim` into the wire
/// `intent_id`. Unknown names fall back to `noop` rather than erroring —
/// the gate and policy VM are defined for every id, so there is no wrong
/// input here, only an uninteresting one.
pub fn parse_intent(name: &str) -> u16 {
    match name.to_lowercase().as_str() {
        "brake" => 1,
        "move" => 2,
        "turn" => 3,
        _ => 0,
    }
}

/// Build one encrypted, MAC'd wire frame the way the off-chip intent
/// model would. Shared by `craft` (one-off frame generation) and `sim`
/// (synthetic traffic generation).
pub fn build_frame(seq: u32, t_ms: u32, intent_id: u16, conf_q15: u16, v0: i16) -> [u8; PACKET_LEN] {
    let mut aux = [0i16; 18];
    aux[0] = v0;
    let plaintext = Packet {
        magic: MAGIC_WORD,
        version: 1,
        model_id: 1,
        seq,
        t_ms,
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

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err("hex string must have an even number of digits".into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}
