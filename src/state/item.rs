//! Plain (non-auction) objects

use serde::{Deserialize, Serialize};

use crate::data_source::ObjectSnapshot;

/// An object offered in an auction, described by its display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemObject {
    pub id: String,
    pub type_descriptor: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&ObjectSnapshot> for ItemObject {
    fn from(snapshot: &ObjectSnapshot) -> Self {
        let display = |key: &str| {
            snapshot
                .display
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
        };

        Self {
            id: snapshot.object_id.clone(),
            type_descriptor: snapshot.type_descriptor.clone(),
            name: display("name"),
            description: display("description"),
            image_url: display("image_url"),
        }
    }
}
