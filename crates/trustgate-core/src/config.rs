//! Build-time configuration constants.
//!
//! Everything here is `const` by design (spec Non-goal: no dynamic
//! configuration, no over-the-wire firmware update). Keys are provisioned
//! at build time and never rotate at runtime.

/// Magic word identifying a well-formed plaintext packet (offset 0).
pub const MAGIC_WORD: u32 = 0xB0A1_E1A1;

/// 128-bit MAC key (SipHash-2-4), as two 64-bit words.
pub const MAC_KEY: [u64; 2] = [0xA3B1_C2D3_E4F5_6789, 0x1020_3040_5060_7080];

/// 256-bit ChaCha20 cipher key, as eight 32-bit words.
pub const CHACHA_KEY: [u32; 8] = [
    0x0102_0304,
    0x0506_0708,
    0x090a_0b0c,
    0x0d0e_0f10,
    0x1112_1314,
    0x1516_1718,
    0x191a_1b1c,
    0x1d1e_1f20,
];

/// Number of motors on the differential drive (left = 0, right = 1).
pub const NUM_MOTORS: usize = 2;

/// PID proportional gain.
pub const PID_KP: f32 = 1.0;
/// PID integral gain.
pub const PID_KI: f32 = 0.1;
/// PID derivative gain.
pub const PID_KD: f32 = 0.05;
/// Integrator clamp, symmetric around zero.
pub const MAX_INTEGRAL: f32 = 100.0;
/// Nominal control rate used for integral/derivative gains.
pub const CONTROL_HZ: f32 = 50.0;
/// Encoder counts per one full revolution.
pub const COUNTS_PER_REV: f32 = 1000.0;
/// PWM output saturation bound (symmetric).
pub const PWM_LIMIT: f32 = 1000.0;

/// Ingress → real-time queue capacity. Must be a power of two.
pub const QUEUE_CAPACITY: usize = 8;

/// Only SPI frames with this command byte are admitted by ingress.
pub const SPI_CMD_INTENT: u8 = 0x01;
/// Expected frame length for an intent frame.
pub const SPI_FRAME_LEN: usize = 64;

/// Confidence threshold below which the gate forces rejection of motion.
/// Expressed directly in Q15 units (`threshold / 32768.0` as a float).
pub const MIN_MOTION_CONFIDENCE_Q15: u16 = 1;
