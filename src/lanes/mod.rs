//! Query lanes: long-lived workers that each hold pending query text, run it
//! against the shared [`Engine`](qlanes_engine::Engine) on demand, and report
//! back to a single consumer.
//!
//! ```text
//!  consumer thread                          lane-N thread
//!  ───────────────                          ─────────────
//!  Registry::submit ──► pending input ──┐
//!                       Wake::signal ───┼──► Idle ─► Deciding ─┬─► Idle   (blank input)
//!                                       │                      ├─► Stopped (shutting down)
//!                                       │                      └─► Executing ─► Idle
//!                                       │                               │
//!  Delivery::dispatch ◄── consumer queue ◄── on_outcome_ready ◄─────────┘ (if active)
//!   (rechecks active lane)
//! ```

mod config;
mod error;
mod handoff;
mod lane;
mod registry;
mod shutdown;
mod wake;
mod worker;


pub use config::{DEFAULT_DISPLAY_LIMIT, LaneConfig};
pub use error::LaneError;
pub use handoff::{Delivery, DeliveryKind};
pub use lane::{Failure, Lane, LaneId, LaneSnapshot, Outcome, Phase, ResultSet};
pub use registry::Registry;
