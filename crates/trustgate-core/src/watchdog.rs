//! Watchdog strobe: pulsed exactly once per accepted-and-dispatched packet
//! (spec §4.7). Absence of strobes within the watchdog's timeout window is
//! the terminal fail-safe — cutting motor power is the hardware's job, not
//! software's; this module only ever pulses the pin.

use crate::hal::Hal;

/// Pulse the hardware watchdog pin.
pub fn strobe(hal: &mut dyn Hal) {
    hal.watchdog_strobe();
}
