//! Persistence for small string values
//!
//! - `store`: the `KeyValueStore` trait with in-memory and JSON-file backends
//! - `io`: atomic file writes
//! - `writer`: ordered background writes

pub mod io;
pub mod store;
pub mod writer;

pub use store::*;
pub use writer::*;
