//! Inbound webhook handling: subscription handshake and event normalization.

pub mod event;
pub mod verify;

pub use event::{InboundEvent, NormalizedMessage, Origin};
pub use verify::{VerifyOutcome, VerifyParams, verify};
