//! The booking and inventory consistency engine. Components run their
//! read-checks and writes inside one [`crate::store::UnitOfWork`]; callers
//! see either a fully committed outcome or a single terminal error.

pub mod attendance;
pub mod cancel;
pub mod error;
pub mod interval;
pub mod ledger;
pub mod orders;
pub mod resources;
pub mod schedule;

pub use attendance::FeedbackRequest;
pub use cancel::CancelOutcome;
pub use error::EngineError;
pub use orders::{PurchaseOutcome, PurchaseRequest};
pub use resources::{BookingOutcome, BookingRequest, MaintenanceRequest};
pub use schedule::NewEvent;
