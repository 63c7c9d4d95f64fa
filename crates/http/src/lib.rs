//! ul-http: HTTP transfer endpoint for the uplink client
//!
//! Provides [`HttpEndpoint`], the production implementation of the
//! `TransferEndpoint` trait from ul-core, speaking a GCS-style resumable
//! upload protocol over `reqwest`.

mod client;

pub use client::HttpEndpoint;
