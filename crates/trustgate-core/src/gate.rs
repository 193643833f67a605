//! Safety gate: the last line of defense between policy and actuation
//! (spec §4.4). Pure and total like the VM, but sees invariants the VM
//! cannot — confidence, hardware-safe parameter bounds. The gate MUST
//! reject any action whose parameters fall outside hardware-safe bounds
//! even if the VM approved it; it is never overruled.

use crate::config::{MIN_MOTION_CONFIDENCE_Q15, PWM_LIMIT};
use crate::wire::{Action, ActionKind, Packet};

/// Hardware-safe bound on the raw `v0` parameter before the `/100.0`
/// scaling in dispatch — keeps a single malformed packet from requesting a
/// target velocity the PID loop would otherwise have to clamp away.
const MAX_V0_MAGNITUDE: i16 = PWM_LIMIT as i16;

/// Decide whether `action` may be dispatched given the packet it was
/// derived from.
pub fn allow(action: &Action, packet: &Packet) -> bool {
    match action.act {
        ActionKind::Noop => true,
        ActionKind::Brake => action.v0.unsigned_abs() <= MAX_V0_MAGNITUDE as u16,
        ActionKind::Move | ActionKind::Turn => {
            if packet.conf_q15 < MIN_MOTION_CONFIDENCE_Q15 {
                return false;
            }
            action.v0.unsigned_abs() <= MAX_V0_MAGNITUDE as u16
        }
    }
}
