//! Message Communication Protocol (MCP)
//!
//! Standard envelope for every hand-off between agents: type tag,
//! sender, receiver, a unique trace id, a timestamp and a typed payload.
//! The orchestrator validates each stage's envelope before moving on.

pub mod envelope;
pub mod payload;

pub use envelope::{create_mcp, validate_mcp, validate_raw, Envelope, REQUIRED_KEYS};
pub use payload::{
    CasesPayload, ErrorPayload, MessageType, Payload, PricingPayload, SectionsPayload,
};
