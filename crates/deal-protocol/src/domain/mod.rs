//! Domain layer: the deal aggregate, status machine, and availability
//! mapping. Pure logic, no I/O.

pub mod availability;
pub mod entities;
pub mod errors;
