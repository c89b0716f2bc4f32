//! Binary layout primitives for the AOKV append-only key-value container.
//!
//! This crate has no I/O dependencies: it owns the magic numbers, fixed-width
//! header/footer structs, error enum, security limits, and the typed-array
//! element-kind enumeration that the higher layers (`aokv-codec`, `aokv-io`)
//! build on. Nothing here reads or writes a file.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod constants;
pub mod error;
pub mod limits;
pub mod types;

pub use block::{Footer, IndexHeader, KvpHeader, MagicHeader};
pub use error::{AokvError, Result};
pub use limits::Limits;
pub use types::ElementKind;
