//! Core domain types
//!
//! These types are produced by the discovery pipeline and consumed by the
//! profile renderer. They are the only data shared across the workspace.

pub mod account;
