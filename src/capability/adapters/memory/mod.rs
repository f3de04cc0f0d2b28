//! In-memory adapters.

mod catalog;
mod store;

pub use catalog::InMemoryCapabilityInfoRepository;
pub use store::InMemoryResourceStore;
