//! Caplink: capability plugin transport, registry, and call dispatch.
//!
//! A controller process delegates capability logic to independently
//! compiled plugin executables. This crate carries typed domain objects
//! across that process boundary, binds remote calls to the dependent
//! resources a plugin declares for an owner, and resolves which plugin
//! handles a requested capability category and type.
//!
//! # Architecture
//!
//! Caplink follows hexagonal architecture principles:
//!
//! - **Domain**: capability values, descriptors, and the object codec
//! - **Wire**: call envelopes, replies, handshake, and framing
//! - **Ports**: traits for transports, launchers, stores, and repositories
//! - **Services**: the remote call client, proxies, registry, and host
//! - **Adapters**: process, in-process, and in-memory implementations
//!
//! # Modules
//!
//! - [`capability`]: plugin hosting and serving

pub mod capability;
