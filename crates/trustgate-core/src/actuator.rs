//! Actuator dispatch: translate an accepted action into motor targets or a
//! GPIO write (spec §4.5). The `/100.0` scaling converts the int16
//! parameter to a float target; saturation to the motor-achievable range
//! is deferred to the PID loop's output clamp.

use crate::hal::Hal;
use crate::pid::MotorBank;
use crate::wire::{Action, ActionKind};

/// Scale factor converting a raw `v0` parameter to a rad/s target.
const VELOCITY_SCALE: f32 = 100.0;

/// Apply an accepted action: assert the brake GPIO, or set motor targets.
/// A `Noop` action changes nothing.
pub fn dispatch(action: &Action, motors: &mut MotorBank, hal: &mut dyn Hal) {
    match action.act {
        ActionKind::Noop => {}
        ActionKind::Brake => hal.gpio_set(action.act as u8, action.v0),
        ActionKind::Move => {
            let v = action.v0 as f32 / VELOCITY_SCALE;
            motors.set_target(0, v);
            motors.set_target(1, v);
        }
        ActionKind::Turn => {
            let v = action.v0 as f32 / VELOCITY_SCALE;
            motors.set_target(0, v);
            motors.set_target(1, -v);
        }
    }
}
