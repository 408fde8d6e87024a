//! Object change extractors
//!
//! Callers that submit a create or registration transaction themselves use
//! these to learn the id of the new object from the returned effects.

use crate::data_source::{ObjectChange, ObjectChangeKind};
use crate::parser::normalize_address;

/// Kinds of objects the auction package creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectCategory {
    Auction,
    User,
}

impl ObjectCategory {
    /// Type prefix identifying this category inside `package`
    ///
    /// `module` is the module holding the auction entry functions; users
    /// always live in `user`.
    pub fn type_prefix(&self, package: &str, module: &str) -> String {
        match self {
            ObjectCategory::Auction => format!("{}::{}::Auction<", package, module),
            ObjectCategory::User => format!("{}::user::User", package),
        }
    }

    /// Matches the package in either its given or its full-width form
    pub fn matches(&self, package: &str, module: &str, object_type: &str) -> bool {
        object_type.starts_with(&self.type_prefix(package, module))
            || object_type.starts_with(&self.type_prefix(&normalize_address(package), module))
    }
}

fn find_object<'a>(
    changes: &'a [ObjectChange],
    category: ObjectCategory,
    package: &str,
    module: &str,
    kinds: &[ObjectChangeKind],
) -> Option<&'a str> {
    changes
        .iter()
        .filter(|change| kinds.contains(&change.kind))
        .find(|change| {
            change
                .object_type
                .as_deref()
                .is_some_and(|t| category.matches(package, module, t))
        })
        .and_then(|change| change.object_id.as_deref())
}

/// Id of the first object of `category` created by the transaction
pub fn find_created_object<'a>(
    changes: &'a [ObjectChange],
    category: ObjectCategory,
    package: &str,
    module: &str,
) -> Option<&'a str> {
    find_object(changes, category, package, module, &[ObjectChangeKind::Created])
}

/// Id of the first object of `category` created or mutated by the transaction
pub fn find_created_or_mutated_object<'a>(
    changes: &'a [ObjectChange],
    category: ObjectCategory,
    package: &str,
    module: &str,
) -> Option<&'a str> {
    find_object(
        changes,
        category,
        package,
        module,
        &[ObjectChangeKind::Created, ObjectChangeKind::Mutated],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = "0xpkg";
    const MODULE: &str = "auction";

    fn change(kind: ObjectChangeKind, object_type: &str, id: &str) -> ObjectChange {
        ObjectChange {
            kind,
            object_type: Some(object_type.to_string()),
            object_id: Some(id.to_string()),
        }
    }

    fn sample_changes() -> Vec<ObjectChange> {
        vec![
            change(ObjectChangeKind::Mutated, "0x2::coin::Coin<0x2::sui::SUI>", "0xgas"),
            change(ObjectChangeKind::Mutated, "0xpkg::user::User", "0xuser"),
            change(
                ObjectChangeKind::Created,
                "0xpkg::auction::Auction<0x2::sui::SUI>",
                "0xauction",
            ),
            ObjectChange {
                kind: ObjectChangeKind::Published,
                object_type: None,
                object_id: None,
            },
        ]
    }

    #[test]
    fn test_find_created_auction() {
        let changes = sample_changes();
        assert_eq!(
            find_created_object(&changes, ObjectCategory::Auction, PKG, MODULE),
            Some("0xauction")
        );
    }

    #[test]
    fn test_created_ignores_mutated() {
        let changes = sample_changes();
        assert_eq!(find_created_object(&changes, ObjectCategory::User, PKG, MODULE), None);
        assert_eq!(
            find_created_or_mutated_object(&changes, ObjectCategory::User, PKG, MODULE),
            Some("0xuser")
        );
    }

    #[test]
    fn test_other_package_does_not_match() {
        let changes = sample_changes();
        assert_eq!(
            find_created_object(&changes, ObjectCategory::Auction, "0xother", MODULE),
            None
        );
    }

    #[test]
    fn test_type_prefix() {
        assert!(ObjectCategory::Auction.matches(PKG, MODULE, "0xpkg::auction::Auction<0x2::sui::SUI>"));
        assert!(!ObjectCategory::Auction.matches(PKG, MODULE, "0xpkg::auction::AuctionCap"));
        assert!(ObjectCategory::User.matches(PKG, MODULE, "0xpkg::user::User"));
    }

    #[test]
    fn test_auction_prefix_follows_module() {
        let ty = "0xpkg::english::Auction<0x2::sui::SUI>";
        assert!(ObjectCategory::Auction.matches(PKG, "english", ty));
        assert!(!ObjectCategory::Auction.matches(PKG, MODULE, ty));
        assert!(ObjectCategory::User.matches(PKG, "english", "0xpkg::user::User"));

        let changes = vec![change(ObjectChangeKind::Created, ty, "0xa1")];
        assert_eq!(
            find_created_object(&changes, ObjectCategory::Auction, PKG, "english"),
            Some("0xa1")
        );
        assert_eq!(find_created_object(&changes, ObjectCategory::Auction, PKG, MODULE), None);
    }
}
