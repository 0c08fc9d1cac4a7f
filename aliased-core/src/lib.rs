//! Aliased Core
//!
//! Core types and persistence for the aws-aliased-profiles tool.
//!
//! This crate contains:
//! - Domain types: the discovered Account and its Tags
//! - Paths: where the tool keeps its state and template
//! - Store: the on-disk form of a discovery run

pub mod domain;
pub mod error;
pub mod paths;
pub mod store;

pub use domain::account::{Account, AccountId, Tag};
pub use error::StoreError;
pub use paths::ToolPaths;
pub use store::AccountStore;
