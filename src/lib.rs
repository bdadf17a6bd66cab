//! Core crate for `qlanes`: several independent query lanes, each with a
//! dedicated worker thread, reporting to a single consumer.
//!
//! The [`lanes`] module is the execution core. [`console`] is a line-oriented
//! consumer built on it, and the remaining modules carry the application
//! plumbing shared with the binary.

pub mod app_dirs;
pub mod console;
pub mod lanes;
pub mod logging;

pub use lanes::{
	DEFAULT_DISPLAY_LIMIT, Delivery, DeliveryKind, Failure, Lane, LaneConfig, LaneError, LaneId,
	LaneSnapshot, Outcome, Phase, Registry, ResultSet,
};
pub use qlanes_engine as engine;
