use std::fs;

use trustgate_core::wire::{PACKET_LEN, Packet};

use super::decode_hex;

/// Decode a 64-byte frame's plaintext header fields (magic, version,
/// model_id, seq, t_ms) without a key. `intent_id`/`conf_q15`/`aux` are
/// left encrypted on the wire and are printed as raw bytes, not decoded —
/// this tool only ever sees what an observer on the wire would see.
pub fn run(hex: Option<&str>, file: Option<&str>) {
    let raw = match (hex, file) {
        (Some(h), _) => match decode_hex(h) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("invalid hex: {e}");
                std::process::exit(1);
            }
        },
        (None, Some(path)) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("failed to read {path}: {e}");
                std::process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("provide either a hex string or --file");
            std::process::exit(1);
        }
    };

    if raw.len() != PACKET_LEN {
        eprintln!("expected {PACKET_LEN} bytes, got {}", raw.len());
        std::process::exit(1);
    }

    let frame: [u8; PACKET_LEN] = raw.try_into().unwrap();
    let packet = Packet::parse(&frame);

    println!("magic:        0x{:08x} (valid: {})", packet.magic, packet.has_valid_magic());
    println!("version:      {}", packet.version);
    println!("model_id:     {}", packet.model_id);
    println!("seq:          {}", packet.seq);
    println!("t_ms:         {}", packet.t_ms);
    println!("encrypted region (intent_id, conf_q15, aux): {}", super::encode_hex(&frame[16..56]));
    println!("mac:          0x{:016x}", packet.mac);
}
