//! Client for the remote media processing service.
//!
//! `RemoteService` is the seam the job orchestrator talks to; `HttpRemote`
//! implements it over the service's HTTP/JSON API. Nothing in here touches
//! session state.

mod client;
mod error;
mod types;

pub use client::HttpRemote;
pub use error::RemoteError;
pub use types::{FilePayload, RemoteService, SlideshowOptions};

#[cfg(test)]
pub(crate) mod fake;
