//! Split a mixed batch of snapshots into auctions and items

use std::collections::HashMap;

use serde::Serialize;

use super::auction::{AuctionState, derive_auction_state};
use super::item::ItemObject;
use crate::data_source::ObjectSnapshot;
use crate::parser::{DEFAULT_MODULE, ObjectCategory};

/// Result of one fetch-then-classify round
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPartition {
    pub auctions: Vec<AuctionState>,
    pub items: Vec<ItemObject>,
    pub items_by_id: HashMap<String, ItemObject>,
}

impl ObjectPartition {
    pub fn item(&self, id: &str) -> Option<&ItemObject> {
        self.items_by_id.get(id)
    }
}

/// Partition snapshots by type, deriving auction state at `observed_at_ms`
///
/// Auctions that fail to decode are logged and left out.
pub fn partition_objects(
    snapshots: &[ObjectSnapshot],
    package_id: &str,
    observed_at_ms: u64,
) -> ObjectPartition {
    partition_module_objects(snapshots, package_id, DEFAULT_MODULE, observed_at_ms)
}

/// [`partition_objects`] for a deployment whose auctions live in `module`
pub fn partition_module_objects(
    snapshots: &[ObjectSnapshot],
    package_id: &str,
    module: &str,
    observed_at_ms: u64,
) -> ObjectPartition {
    let mut partition = ObjectPartition::default();

    for snapshot in snapshots {
        if ObjectCategory::Auction.matches(package_id, module, &snapshot.type_descriptor) {
            match derive_auction_state(snapshot, observed_at_ms) {
                Ok(state) => partition.auctions.push(state),
                Err(e) => tracing::warn!(object = %snapshot.object_id, "Auction unavailable: {}", e),
            }
        } else {
            let item = ItemObject::from(snapshot);
            partition.items_by_id.insert(item.id.clone(), item.clone());
            partition.items.push(item);
        }
    }

    tracing::debug!(
        auctions = partition.auctions.len(),
        items = partition.items.len(),
        "Partitioned {} objects",
        snapshots.len()
    );

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::auction::tests::auction_snapshot;

    fn item_snapshot(id: &str) -> ObjectSnapshot {
        ObjectSnapshot {
            object_id: id.to_string(),
            type_descriptor: "0xnft::card::Card".to_string(),
            fields: Default::default(),
            display: Default::default(),
        }
    }

    #[test]
    fn test_partition_mixed_batch() {
        let mut broken = auction_snapshot("0xbroken", "0x0", "0", 0);
        broken.fields.remove("item_bag");

        let snapshots = vec![
            item_snapshot("0xi1"),
            auction_snapshot("0xa1", "0xb0b", "10", 1),
            item_snapshot("0xi2"),
            broken,
        ];

        let partition = partition_objects(&snapshots, "0xpkg", 0);

        assert_eq!(partition.auctions.len(), 1);
        assert_eq!(partition.auctions[0].id, "0xa1");
        assert_eq!(partition.items.len(), 2);
        assert_eq!(partition.items[1].id, "0xi2");
        assert_eq!(partition.items_by_id.len(), 2);
        assert!(partition.item("0xi1").is_some());
        assert!(partition.item("0xa1").is_none());
    }

    #[test]
    fn test_auction_of_other_package_is_an_item() {
        let snapshots = vec![auction_snapshot("0xa1", "0x0", "0", 1)];
        let partition = partition_objects(&snapshots, "0xother", 0);
        assert!(partition.auctions.is_empty());
        assert_eq!(partition.items.len(), 1);
    }

    #[test]
    fn test_partition_follows_module() {
        let mut snapshot = auction_snapshot("0xa1", "0x0", "0", 1);
        snapshot.type_descriptor = "0xpkg::english::Auction<0x2::sui::SUI>".to_string();
        let snapshots = vec![snapshot];

        let partition = partition_module_objects(&snapshots, "0xpkg", "english", 0);
        assert_eq!(partition.auctions.len(), 1);

        let partition = partition_objects(&snapshots, "0xpkg", 0);
        assert!(partition.auctions.is_empty());
        assert_eq!(partition.items.len(), 1);
    }
}
