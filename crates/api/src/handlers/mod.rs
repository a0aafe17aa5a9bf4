//! Request handlers.
//!
//! Each submodule provides async handler functions for one route group and
//! maps errors via [`AppError`](crate::error::AppError).

pub mod agent;
pub mod connections;
