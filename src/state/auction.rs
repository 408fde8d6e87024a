//! Auction state derived from an object snapshot

use serde::{Deserialize, Serialize};

use crate::data_source::ObjectSnapshot;
use crate::error::DecodeError;
use crate::parser::{
    ZERO_ADDRESS, currency_type_from_descriptor, de_u64, de_u128, normalize_address,
};

/// Container holding the auctioned items on-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContainer {
    pub id: String,
    pub size: u64,
}

/// Auction as seen at one instant
///
/// The flags depend on the observation time, so a state is never cached:
/// derive it again from the snapshot whenever the clock moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionState {
    pub id: String,
    pub currency_type: String,

    pub name: String,
    pub description: String,
    pub item_addresses: Vec<String>,
    pub item_container: ItemContainer,

    pub admin_address: String,
    pub payout_address: String,
    /// Normalized; `ZERO_ADDRESS` when nobody has bid
    pub leader_address: String,
    pub leader_amount: u128,

    pub begin_time_ms: u64,
    pub end_time_ms: u64,

    pub minimum_bid: u128,
    pub minimum_increase_bps: u64,
    pub extension_period_ms: u64,

    pub has_started: bool,
    pub has_ended: bool,
    pub is_live: bool,
    pub has_leader: bool,
    pub has_balance: bool,
    pub is_cancelled: bool,

    pub can_anyone_disburse_funds: bool,
    pub can_anyone_deliver_items_to_winner: bool,
    pub can_admin_accept_bid: bool,
    pub can_admin_cancel: bool,
    pub can_admin_reclaim_items: bool,
    pub can_admin_set_payout_address: bool,
}

impl AuctionState {
    /// Current leader, if any
    pub fn leader(&self) -> Option<&str> {
        self.has_leader.then_some(self.leader_address.as_str())
    }
}

// Move field layout of `auction::Auction<T>` as returned by the RPC

#[derive(Debug, Deserialize)]
struct UidField {
    id: String,
}

#[derive(Debug, Deserialize)]
struct BagField {
    fields: BagFields,
}

#[derive(Debug, Deserialize)]
struct BagFields {
    id: UidField,
    #[serde(deserialize_with = "de_u64")]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct AuctionFields {
    id: UidField,
    name: String,
    description: String,
    #[serde(default)]
    item_addrs: Vec<String>,
    item_bag: BagField,
    admin_addr: String,
    pay_addr: String,
    lead_addr: String,
    #[serde(deserialize_with = "de_u128")]
    lead_bal: u128,
    #[serde(deserialize_with = "de_u64")]
    begin_time_ms: u64,
    #[serde(deserialize_with = "de_u64")]
    end_time_ms: u64,
    #[serde(deserialize_with = "de_u128")]
    minimum_bid: u128,
    #[serde(deserialize_with = "de_u64")]
    minimum_increase_bps: u64,
    #[serde(deserialize_with = "de_u64")]
    extension_period_ms: u64,
}

/// Derive the auction state seen at `observed_at_ms`
pub fn derive_auction_state(
    snapshot: &ObjectSnapshot,
    observed_at_ms: u64,
) -> Result<AuctionState, DecodeError> {
    let currency_type = currency_type_from_descriptor(&snapshot.type_descriptor).ok_or_else(|| {
        DecodeError::snapshot(format!(
            "{}: no currency type in {}",
            snapshot.object_id, snapshot.type_descriptor
        ))
    })?;

    let fields: AuctionFields =
        serde_json::from_value(serde_json::Value::Object(snapshot.fields.clone()))
            .map_err(|e| DecodeError::snapshot(format!("{}: {}", snapshot.object_id, e)))?;

    let leader_address = normalize_address(&fields.lead_addr);
    let has_leader = leader_address != ZERO_ADDRESS;
    let item_count = fields.item_bag.fields.size;

    let has_started = observed_at_ms >= fields.begin_time_ms;
    let has_ended = observed_at_ms >= fields.end_time_ms;
    let is_live = has_started && !has_ended;
    let has_balance = fields.lead_bal > 0;
    let is_cancelled = has_ended && !has_leader;

    let can_anyone_disburse_funds = has_ended && has_balance;
    let can_anyone_deliver_items_to_winner = has_ended && has_leader && item_count > 0;
    let can_admin_accept_bid = is_live && has_leader;
    let can_admin_cancel = !has_ended;
    let can_admin_reclaim_items = has_ended && !has_leader && item_count > 0;
    // Before the end, or after it while unclaimed funds remain
    #[allow(clippy::nonminimal_bool)]
    let can_admin_set_payout_address = !has_ended || (has_ended && has_balance);

    Ok(AuctionState {
        id: fields.id.id,
        currency_type,
        name: fields.name,
        description: fields.description,
        item_addresses: fields.item_addrs,
        item_container: ItemContainer {
            id: fields.item_bag.fields.id.id,
            size: item_count,
        },
        admin_address: fields.admin_addr,
        payout_address: fields.pay_addr,
        leader_address,
        leader_amount: fields.lead_bal,
        begin_time_ms: fields.begin_time_ms,
        end_time_ms: fields.end_time_ms,
        minimum_bid: fields.minimum_bid,
        minimum_increase_bps: fields.minimum_increase_bps,
        extension_period_ms: fields.extension_period_ms,
        has_started,
        has_ended,
        is_live,
        has_leader,
        has_balance,
        is_cancelled,
        can_anyone_disburse_funds,
        can_anyone_deliver_items_to_winner,
        can_admin_accept_bid,
        can_admin_cancel,
        can_admin_reclaim_items,
        can_admin_set_payout_address,
    })
}
