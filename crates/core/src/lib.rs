//! Shared domain building blocks for the FlowState backend.

pub mod client_id;
pub mod error;
pub mod job;
pub mod types;
