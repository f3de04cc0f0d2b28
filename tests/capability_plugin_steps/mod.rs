//! Step definitions for capability plugin BDD scenarios.

pub mod database_plugin;
pub mod given;
pub mod then;
pub mod when;
pub mod world;
