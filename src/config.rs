//! Configuration loader and schema types.
//!
//! Settings cover the remote service endpoint, where artifacts are saved,
//! how upload directories are expanded and default job parameters.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
