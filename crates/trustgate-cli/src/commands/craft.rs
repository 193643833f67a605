use std::fs;

use super::{build_frame, encode_hex, parse_intent};

pub struct CraftConfig<'a> {
    pub seq: u32,
    pub t_ms: u32,
    pub intent: &'a str,
    pub v0: i16,
    pub confidence: f32,
    pub output: Option<&'a str>,
}

/// Build one properly encrypted, MAC'd frame and either print its hex
/// encoding or write the raw 64 bytes to a file. This is the offline
/// counterpart to what the off-chip intent model would produce on the
/// wire (spec §6).
pub fn run(cfg: CraftConfig) {
    let conf_q15 = (cfg.confidence.clamp(0.0, 1.0) * 32767.0) as u16;
    let raw = build_frame(cfg.seq, cfg.t_ms, parse_intent(cfg.intent), conf_q15, cfg.v0);

    match cfg.output {
        Some(path) => match fs::write(path, raw) {
            Ok(()) => println!("wrote 64-byte frame to {path}"),
            Err(e) => {
                eprintln!("failed to write {path}: {e}");
                std::process::exit(1);
            }
        },
        None => println!("{}", encode_hex(&raw)),
    }
}
