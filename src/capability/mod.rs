//! Capability plugin transport, dispatch, and registry.
//!
//! A controller delegates capability logic (for example "provision a
//! `PostgreSQL` database") to plugin processes. This module carries typed
//! objects across the process boundary, binds remote calls to a specific
//! secondary resource, and resolves which plugin serves a given
//! category/type pair. The module follows hexagonal architecture:
//!
//! - Domain types and the object codec in [`domain`]
//! - Wire envelope and framing in [`wire`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Client, proxy, registry, server, and host services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod wire;

#[cfg(test)]
mod tests;
