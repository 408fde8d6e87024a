//! Output formatting module
//!
//! This module handles formatting classified transactions and derived
//! auction state for the different output formats.

use crate::{
    Result,
    parser::{AuctionTransaction, AuctionTxInputs},
    state::{AuctionState, ObjectPartition},
};
use chrono::DateTime;
use serde_json::json;

/// Output classified transactions as JSON
pub fn transactions_json(
    w: &mut impl std::io::Write,
    transactions: &[AuctionTransaction],
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, transactions)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output an object partition as JSON
pub fn partition_json(w: &mut impl std::io::Write, partition: &ObjectPartition) -> Result<()> {
    let output = json!({
        "auctions": partition.auctions,
        "items": partition.items,
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?;
    Ok(())
}

/// Output an auction's state, items and event history as JSON
pub fn history_json(
    w: &mut impl std::io::Write,
    transactions: &[AuctionTransaction],
    auction: &ObjectPartition,
    items: &ObjectPartition,
) -> Result<()> {
    let output = json!({
        "auction": auction.auctions.first(),
        "items": items.items,
        "summary": {
            "total_transactions": transactions.len(),
        },
        "transactions": transactions,
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?;
    Ok(())
}

fn short(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn format_time(ms: Option<u64>) -> String {
    ms.and_then(|ms| i64::try_from(ms).ok())
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One-line summary of the operation-specific inputs
fn describe(inputs: &AuctionTxInputs) -> String {
    match inputs {
        AuctionTxInputs::AdminCreatesAuction { auction_id, inputs } => format!(
            "{} \"{}\" min {} items {}",
            short(auction_id, 14),
            inputs.name,
            inputs.minimum_bid,
            inputs.item_addresses.len()
        ),
        AuctionTxInputs::AnyoneBids { inputs } => {
            format!("{} amount {}", short(&inputs.auction_address, 14), inputs.amount)
        }
        AuctionTxInputs::AdminAcceptsBid { inputs }
        | AuctionTxInputs::AdminCancelsAuction { inputs }
        | AuctionTxInputs::AnyonePaysFunds { inputs } => short(&inputs.auction_address, 14),
        AuctionTxInputs::AdminSetsPayAddr { inputs } => format!(
            "{} pay {}",
            short(&inputs.auction_address, 14),
            short(&inputs.payout_address, 14)
        ),
        AuctionTxInputs::AnyoneSendsItemToWinner { inputs } => format!(
            "{} item {}",
            short(&inputs.auction_address, 14),
            short(&inputs.item_address, 14)
        ),
    }
}

/// Output classified transactions as text table
pub fn transactions_table(
    w: &mut impl std::io::Write,
    transactions: &[AuctionTransaction],
) -> Result<()> {
    writeln!(w, "Auction Transactions ({})", transactions.len())?;
    writeln!(w, "{:-<120}", "")?;
    writeln!(
        w,
        "{:<16} {:<19} {:<28} {:<16} {:<37}",
        "Digest", "Time (UTC)", "Kind", "Sender", "Details"
    )?;
    writeln!(w, "{:-<120}", "")?;

    for tx in transactions {
        writeln!(
            w,
            "{:<16} {:<19} {:<28} {:<16} {:<37}",
            short(&tx.digest, 14),
            format_time(tx.timestamp_ms),
            tx.kind().function_name(),
            short(&tx.sender_address, 14),
            describe(&tx.inputs)
        )?;
    }
    writeln!(w)?;

    Ok(())
}

fn status(state: &AuctionState) -> &'static str {
    if state.is_live {
        "live"
    } else if !state.has_started {
        "scheduled"
    } else if state.is_cancelled {
        "cancelled"
    } else {
        "ended"
    }
}

fn capabilities(state: &AuctionState) -> String {
    let flags = [
        (state.can_admin_accept_bid, "accept"),
        (state.can_admin_cancel, "cancel"),
        (state.can_admin_reclaim_items, "reclaim"),
        (state.can_admin_set_payout_address, "set-pay"),
        (state.can_anyone_disburse_funds, "disburse"),
        (state.can_anyone_deliver_items_to_winner, "deliver"),
    ];
    let enabled: Vec<&str> = flags
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
    if enabled.is_empty() {
        "-".to_string()
    } else {
        enabled.join(",")
    }
}

/// Output auctions and items as text table
pub fn partition_table(
    w: &mut impl std::io::Write,
    partition: &ObjectPartition,
    observed_at_ms: u64,
) -> Result<()> {
    if !partition.auctions.is_empty() {
        writeln!(
            w,
            "Auctions ({}) at {}",
            partition.auctions.len(),
            format_time(Some(observed_at_ms))
        )?;
        writeln!(w, "{:-<120}", "")?;
        writeln!(
            w,
            "{:<16} {:<16} {:<10} {:<16} {:>12} {:<19} {:<26}",
            "Auction", "Name", "Status", "Leader", "Amount", "Ends (UTC)", "Actions"
        )?;
        writeln!(w, "{:-<120}", "")?;

        for state in &partition.auctions {
            writeln!(
                w,
                "{:<16} {:<16} {:<10} {:<16} {:>12} {:<19} {:<26}",
                short(&state.id, 14),
                short(&state.name, 16),
                status(state),
                state.leader().map(|l| short(l, 14)).unwrap_or_else(|| "-".to_string()),
                state.leader_amount,
                format_time(Some(state.end_time_ms)),
                capabilities(state)
            )?;
        }
        writeln!(w)?;
    }

    if !partition.items.is_empty() {
        writeln!(w, "Items ({})", partition.items.len())?;
        writeln!(w, "{:-<120}", "")?;
        writeln!(w, "{:<16} {:<40} {:<62}", "Item", "Type", "Name")?;
        writeln!(w, "{:-<120}", "")?;

        for item in &partition.items {
            writeln!(
                w,
                "{:<16} {:<40} {:<62}",
                short(&item.id, 14),
                short(&item.type_descriptor, 40),
                item.name.as_deref().unwrap_or("-")
            )?;
        }
        writeln!(w)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::transaction::BidInputs;
    use crate::state::auction::tests::auction_snapshot;
    use crate::state::partition_objects;

    fn create_test_transaction() -> AuctionTransaction {
        AuctionTransaction {
            digest: "9fzXk2LmQpRr".to_string(),
            timestamp_ms: Some(1_712_000_000_000),
            sender_address: "0xb0b".to_string(),
            inputs: AuctionTxInputs::AnyoneBids {
                inputs: BidInputs {
                    currency_type: "0x2::sui::SUI".to_string(),
                    auction_address: "0xa1".to_string(),
                    amount: 500,
                },
            },
        }
    }

    #[test]
    fn test_transactions_json() {
        let mut buf = Vec::new();
        transactions_json(&mut buf, &[create_test_transaction()]).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["kind"], "anyone_bids");
        assert_eq!(value[0]["senderAddress"], "0xb0b");
        assert_eq!(value[0]["inputs"]["amount"], 500);
    }

    #[test]
    fn test_transactions_table() {
        let mut buf = Vec::new();
        transactions_table(&mut buf, &[create_test_transaction()]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Auction Transactions (1)"));
        assert!(text.contains("anyone_bids"));
        assert!(text.contains("2024-04-01 19:33:20"));
        assert!(text.contains("0xa1 amount 500"));
    }

    #[test]
    fn test_partition_table() {
        let snapshots = vec![auction_snapshot("0xa1", "0xb0b", "700", 1)];
        let partition = partition_objects(&snapshots, "0xpkg", 2_000);

        let mut buf = Vec::new();
        partition_table(&mut buf, &partition, 2_000).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Auctions (1)"));
        assert!(text.contains("live"));
        assert!(text.contains("accept,cancel,set-pay"));
        assert!(!text.contains("Items ("));
    }

    #[test]
    fn test_short() {
        assert_eq!(short("0x1234", 14), "0x1234");
        assert_eq!(short("0x0123456789abcdef", 10), "0x01234...");
    }
}
