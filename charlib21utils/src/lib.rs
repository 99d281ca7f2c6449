//!
//! # CharLib21 Internal Utilities Crate
//!

pub mod enumstr;
pub use enumstr::*;

pub mod error;
pub use error::*;

pub mod ser;
pub use ser::*;
