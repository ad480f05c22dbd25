//! # Shared Types Crate
//!
//! Identifiers, timestamps, and the property snapshot shared across the
//! LeaseHold subsystem crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Opaque Identifiers**: User and property ids come from the external
//!   identity and catalog collaborators and are treated as opaque strings;
//!   deal ids are generated locally.

pub mod ids;
pub mod property;

pub use ids::{DealId, PropertyId, Timestamp, UserId};
pub use property::{PropertySnapshot, PropertyStatus};
