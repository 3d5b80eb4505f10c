//! Signed webhook callbacks

pub mod hub;
pub mod signature;

pub use hub::{CallbackDelivery, CallbackEnvelope, CallbackHub, PendingCallback};
pub use signature::{CallbackError, DEFAULT_TOLERANCE_SECS, sign, verify};
