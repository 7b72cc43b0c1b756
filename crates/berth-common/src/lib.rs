//! # berth-common
//!
//! Shared types for the Berth provisioner.
//!
//! This crate provides:
//! - The assembly/component request model
//! - Ordered key/value input and output lists
//! - Container ID validation
//! - Common error types

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod kv;
pub mod model;

pub use error::{BerthError, BerthResult};
pub use id::ContainerId;
pub use kv::{KeyValueList, KeyValuePair};
pub use model::{Artifacts, AssemblyWithComponents, Component, Operation};
