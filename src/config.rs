//! Settings loader and schema types.
//!
//! Covers the catalog API key, the backend endpoint, cache and log
//! locations, the external player command and UI list sizes.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
