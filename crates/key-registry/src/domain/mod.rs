//! Domain layer: key record and PEM validation, no I/O.

pub mod errors;
pub mod pem;
pub mod record;
