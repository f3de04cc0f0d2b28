//! Unit tests for the capability module.
//!
//! A small cache plugin fixture drives the client, proxy, registry, server,
//! and host services through in-process and mocked transports.

mod client_tests;
mod server_tests;
