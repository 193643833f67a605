//! # trustgate-core
//!
//! **Two untrusted bytes on a wire should never reach a motor without
//! being checked twice.**
//!
//! `trustgate-core` is the trust-and-control pipeline for a small
//! differential-drive robot whose high-level "intent" decisions are
//! produced off-chip and delivered as authenticated, encrypted 64-byte
//! frames. Every frame is MAC-verified, decrypted, checked for replay, run
//! through a policy VM, vetted by a safety gate, and — only if every stage
//! agrees — actuated through a closed-loop PID velocity controller while
//! strobing a hardware watchdog.
//!
//! ## Quick Start
//!
//! ```no_run
//! use trustgate_core::hal::SimHal;
//! use trustgate_core::queue::FrameQueue;
//! use trustgate_core::runtime::{CycleOutcome, Runtime};
//!
//! let queue = FrameQueue::new();
//! let mut runtime = Runtime::new(SimHal::new());
//!
//! // Ingress domain (a separate thread/core in production) pushes frames
//! // into `queue`; the real-time domain drains them one at a time.
//! if let CycleOutcome::Idle = runtime.run_once(&queue) {
//!     // nothing queued this tick
//! }
//! ```
//!
//! ## Architecture
//!
//! Ingress (untrusted) → [`queue::FrameQueue`] → [`auth::Authenticator`] →
//! [`policy::decide`] → [`gate::allow`] → [`actuator::dispatch`] →
//! [`pid::MotorBank`] → [`watchdog::strobe`]
//!
//! Every stage after the queue runs on a single real-time domain with all
//! interrupts disabled (spec §5); a failure at any stage discards the
//! current packet with no side effect and no strobe.

pub mod actuator;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod gate;
pub mod hal;
pub mod pid;
pub mod policy;
pub mod queue;
pub mod runtime;
pub mod watchdog;
pub mod wire;

pub use auth::{Authenticator, RejectReason};
pub use gate::allow;
pub use hal::{Hal, SimHal};
pub use pid::MotorBank;
pub use policy::decide;
pub use queue::FrameQueue;
pub use runtime::{CycleOutcome, Runtime};
pub use wire::{Action, ActionKind, Packet};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
