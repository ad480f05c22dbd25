//! Adapters implementing the key registry ports.

pub mod memory;
