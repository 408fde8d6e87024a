//! State module - Derive auction state and classify fetched objects

pub mod auction;
pub mod item;
pub mod partition;

// Re-export key types
pub use auction::{AuctionState, ItemContainer, derive_auction_state};
pub use item::ItemObject;
pub use partition::{ObjectPartition, partition_module_objects, partition_objects};
