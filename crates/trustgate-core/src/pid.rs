//! Per-motor closed-loop PID velocity controller, run once per processed
//! packet at the nominal 50 Hz cadence (spec §4.6).
//!
//! The loop uses the *actual* elapsed time to compute measured velocity
//! but a *nominal* `1/CONTROL_HZ` for the integral and derivative terms —
//! this is deliberate (gains are tuned for the nominal cadence; packet
//! jitter is absorbed by the measurement path), not an oversight.

use crate::config::{
    CONTROL_HZ, COUNTS_PER_REV, MAX_INTEGRAL, NUM_MOTORS, PID_KD, PID_KI, PID_KP, PWM_LIMIT,
};
use crate::hal::Hal;

/// Per-motor controller state (spec §3 "Motor state").
#[derive(Debug, Clone, Copy, Default)]
pub struct MotorState {
    prev_count: i32,
    velocity: f32,
    target_velocity: f32,
    integral: f32,
    prev_error: f32,
    last_update_ms: u32,
}

/// The fixed two-motor differential-drive bank (left = 0, right = 1).
pub struct MotorBank {
    motors: [MotorState; NUM_MOTORS],
}

impl MotorBank {
    /// Zero all motor state and reset each motor's hardware encoder —
    /// mirrors the original firmware's `motor_control_init`.
    pub fn new(hal: &mut dyn Hal) -> Self {
        for motor_id in 0..NUM_MOTORS as u8 {
            hal.encoder_reset(motor_id);
        }
        MotorBank {
            motors: [MotorState::default(); NUM_MOTORS],
        }
    }

    pub fn set_target(&mut self, motor_id: usize, target_velocity: f32) {
        self.motors[motor_id].target_velocity = target_velocity;
    }

    pub fn target(&self, motor_id: usize) -> f32 {
        self.motors[motor_id].target_velocity
    }

    pub fn velocity(&self, motor_id: usize) -> f32 {
        self.motors[motor_id].velocity
    }

    pub fn integral(&self, motor_id: usize) -> f32 {
        self.motors[motor_id].integral
    }

    /// Run one control cycle for every motor: measure, control, command.
    /// Returns the PWM duty written to each motor.
    pub fn run(&mut self, now_ms: u32, hal: &mut dyn Hal) -> [i16; NUM_MOTORS] {
        let mut out = [0i16; NUM_MOTORS];
        for (motor_id, slot) in out.iter_mut().enumerate() {
            *slot = self.update_one(motor_id, now_ms, hal);
        }
        out
    }

    fn update_one(&mut self, motor_id: usize, now_ms: u32, hal: &mut dyn Hal) -> i16 {
        let m = &mut self.motors[motor_id];

        // 1. Measure.
        let count = hal.encoder_get_count(motor_id as u8);
        let delta_count = count.wrapping_sub(m.prev_count);
        m.prev_count = count;
        let dt = now_ms.wrapping_sub(m.last_update_ms) as f32 / 1000.0;
        if dt > 0.0 {
            m.velocity = (delta_count as f32 * 2.0 * std::f32::consts::PI) / (COUNTS_PER_REV * dt);
        }
        m.last_update_ms = now_ms;

        // 2. Control (nominal dt for I/D terms regardless of actual dt).
        let error = m.target_velocity - m.velocity;
        m.integral += error * (1.0 / CONTROL_HZ);
        m.integral = m.integral.clamp(-MAX_INTEGRAL, MAX_INTEGRAL);
        let derivative = (error - m.prev_error) * CONTROL_HZ;
        m.prev_error = error;
        let output = PID_KP * error + PID_KI * m.integral + PID_KD * derivative;
        let output = output.clamp(-PWM_LIMIT, PWM_LIMIT);

        // 3. Command.
        let pwm = output as i16;
        hal.pwm_set_duty(motor_id as u8, pwm);
        pwm
    }
}
