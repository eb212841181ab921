//! Price-threshold alert evaluation.
//!
//! Alerts trigger on a relative tolerance band around the target price
//! rather than exact equality, since consecutive feed ticks rarely hit
//! a target exactly. A triggered alert is deactivated immediately so a
//! sustained in-band price cannot refire it; re-arming is an explicit
//! user decision relayed back through the engine.

pub mod engine;
pub mod error;

pub use engine::{AlertDecision, AlertEngine, PriceAlert, TriggeredAlert, DEFAULT_TOLERANCE};
pub use error::{AlertError, AlertResult};
