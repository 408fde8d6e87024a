//! Argument layouts of `admin_creates_auction`
//!
//! The create call dropped its `item_addrs` argument when items moved from a
//! direct address vector to object references. Each known shape is one row
//! in [`CREATE_AUCTION_LAYOUTS`]; a future migration adds a row here instead
//! of touching the classifier.

/// Argument positions for one historical shape of the create call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateAuctionLayout {
    pub arg_count: usize,
    pub name: usize,
    pub description: usize,
    /// Present only while items were passed as a direct vector
    pub item_addrs: Option<usize>,
    pub pay_addr: usize,
    pub begin_delay_ms: usize,
    pub duration_ms: usize,
    pub minimum_bid: usize,
    pub minimum_increase_bps: usize,
    pub extension_period_ms: usize,
}

impl CreateAuctionLayout {
    /// Layout for a given argument count, where fields after the dropped
    /// vector shift left by `FULL_ARG_COUNT - arg_count`
    const fn shifted(arg_count: usize) -> Self {
        let offset = FULL_ARG_COUNT - arg_count;
        Self {
            arg_count,
            name: 0,
            description: 1,
            item_addrs: if offset == 0 { Some(2) } else { None },
            pay_addr: 3 - offset,
            begin_delay_ms: 4 - offset,
            duration_ms: 5 - offset,
            minimum_bid: 6 - offset,
            minimum_increase_bps: 7 - offset,
            extension_period_ms: 8 - offset,
        }
    }
}

/// Argument count of the original create call (trailing clock included)
const FULL_ARG_COUNT: usize = 10;

pub const CREATE_AUCTION_LAYOUTS: &[CreateAuctionLayout] = &[
    CreateAuctionLayout::shifted(10),
    CreateAuctionLayout::shifted(9),
];

/// Find the layout matching a create call's argument count
pub fn create_auction_layout(arg_count: usize) -> Option<&'static CreateAuctionLayout> {
    CREATE_AUCTION_LAYOUTS
        .iter()
        .find(|layout| layout.arg_count == arg_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_vector_layout() {
        let layout = create_auction_layout(10).unwrap();
        assert_eq!(layout.item_addrs, Some(2));
        assert_eq!(layout.pay_addr, 3);
        assert_eq!(layout.extension_period_ms, 8);
    }

    #[test]
    fn test_object_items_layout() {
        let layout = create_auction_layout(9).unwrap();
        assert_eq!(layout.item_addrs, None);
        assert_eq!(layout.name, 0);
        assert_eq!(layout.description, 1);
        assert_eq!(layout.pay_addr, 2);
        assert_eq!(layout.begin_delay_ms, 3);
        assert_eq!(layout.duration_ms, 4);
        assert_eq!(layout.minimum_bid, 5);
        assert_eq!(layout.minimum_increase_bps, 6);
        assert_eq!(layout.extension_period_ms, 7);
    }

    #[test]
    fn test_unknown_arg_count() {
        assert!(create_auction_layout(8).is_none());
        assert!(create_auction_layout(11).is_none());
    }

    #[test]
    fn test_layouts_stay_in_bounds() {
        for layout in CREATE_AUCTION_LAYOUTS {
            let max = [
                layout.pay_addr,
                layout.begin_delay_ms,
                layout.duration_ms,
                layout.minimum_bid,
                layout.minimum_increase_bps,
                layout.extension_period_ms,
            ]
            .into_iter()
            .chain(layout.item_addrs)
            .max()
            .unwrap();
            assert!(max < layout.arg_count);
        }
    }
}
