//!
//! # Liberty21 Cell-Library Attribute-Tree Parser & Writer
//!
//! Liberty is the IC industry's de facto standard for describing the timing,
//! power, and electrical characteristics of standard-cell libraries.
//! On disk it is a hierarchical text format of nested *groups*, each with a
//! type tag, an optional name list, and a set of *attributes*:
//!
//! ```text
//! library (sample) {
//!     nom_voltage : 1.1;
//!     cell (INV_X1) {
//!         pin (A) {
//!             direction : input;
//!             capacitance : 0.002;
//!         }
//!     }
//! }
//! ```
//!
//! Liberty21 parses this format into a generic, order-preserving
//! group/attribute tree ([LibertyTree]), supports in-place mutation of
//! attributes through a small set of primitives (find, create, delete,
//! append), and writes the tree back out. It is deliberately schema-agnostic:
//! it knows the group/attribute *syntax*, not which group types or attribute
//! names are meaningful. Schema-aware consumers (notably the `charlib21`
//! characterization crate) layer their own typing atop this tree.
//!
//! The grammar subset covered is the one cell-characterization data lives in:
//! nested groups, simple (`name : value ;`) and complex (`name (v, ...) ;`)
//! attributes, block and line comments, quoted (possibly multi-line) strings,
//! and backslash line-continuations.
//!

pub mod data;
pub use data::*;

pub mod read;
pub mod write;

#[cfg(test)]
mod tests;
