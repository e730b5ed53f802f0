//! # API Shared
//!
//! Shared definitions for the triage APIs.
//!
//! Contains:
//! - JSON wire types for requests and responses (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `triage` CLI so both speak the same JSON.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
