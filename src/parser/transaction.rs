//! Auction transaction classification
//!
//! Turns a raw transaction response into one typed [`AuctionTransaction`].
//! The parser scans the programmable transaction's commands left to right,
//! remembers the side-channel commands some operations depend on, and
//! decodes the first call into the auction module it recognizes.
//!
//! Classification never fails loudly: anything that does not decode cleanly
//! yields `None`, so a batch of historical transactions is never aborted by
//! one third-party or malformed entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data_source::{
    Argument, Command, MoveCall, ObjectChangeKind, ProgrammableTransaction, TxInput, TxResponse,
};
use crate::error::DecodeError;
use crate::parser::effects::ObjectCategory;
use crate::parser::encoding::bcs_addresses;
use crate::parser::layout::{CreateAuctionLayout, create_auction_layout};
use crate::parser::{
    DEFAULT_MODULE, json_bytes, json_string, json_string_vec, json_u64, json_u128,
    normalize_address,
};

/// Auction entry functions recognized by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionTxKind {
    AdminCreatesAuction,
    AnyoneBids,
    AdminAcceptsBid,
    AdminCancelsAuction,
    AdminSetsPayAddr,
    AnyonePaysFunds,
    AnyoneSendsItemToWinner,
}

impl AuctionTxKind {
    pub const ALL: [AuctionTxKind; 7] = [
        AuctionTxKind::AdminCreatesAuction,
        AuctionTxKind::AnyoneBids,
        AuctionTxKind::AdminAcceptsBid,
        AuctionTxKind::AdminCancelsAuction,
        AuctionTxKind::AdminSetsPayAddr,
        AuctionTxKind::AnyonePaysFunds,
        AuctionTxKind::AnyoneSendsItemToWinner,
    ];

    /// Name of the Move entry function
    pub fn function_name(&self) -> &'static str {
        match self {
            AuctionTxKind::AdminCreatesAuction => "admin_creates_auction",
            AuctionTxKind::AnyoneBids => "anyone_bids",
            AuctionTxKind::AdminAcceptsBid => "admin_accepts_bid",
            AuctionTxKind::AdminCancelsAuction => "admin_cancels_auction",
            AuctionTxKind::AdminSetsPayAddr => "admin_sets_pay_addr",
            AuctionTxKind::AnyonePaysFunds => "anyone_pays_funds",
            AuctionTxKind::AnyoneSendsItemToWinner => "anyone_sends_item_to_winner",
        }
    }

    pub fn from_function(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.function_name() == name)
    }
}

/// Classified auction transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionTransaction {
    pub digest: String,
    pub timestamp_ms: Option<u64>,
    pub sender_address: String,
    #[serde(flatten)]
    pub inputs: AuctionTxInputs,
}

impl AuctionTransaction {
    pub fn kind(&self) -> AuctionTxKind {
        self.inputs.kind()
    }

    /// Auction the transaction acted on
    pub fn auction_address(&self) -> &str {
        match &self.inputs {
            AuctionTxInputs::AdminCreatesAuction { auction_id, .. } => auction_id,
            AuctionTxInputs::AnyoneBids { inputs } => &inputs.auction_address,
            AuctionTxInputs::AdminAcceptsBid { inputs }
            | AuctionTxInputs::AdminCancelsAuction { inputs }
            | AuctionTxInputs::AnyonePaysFunds { inputs } => &inputs.auction_address,
            AuctionTxInputs::AdminSetsPayAddr { inputs } => &inputs.auction_address,
            AuctionTxInputs::AnyoneSendsItemToWinner { inputs } => &inputs.auction_address,
        }
    }
}

/// Operation-specific payload, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AuctionTxInputs {
    AdminCreatesAuction {
        /// Id of the auction object created by this transaction
        auction_id: String,
        inputs: CreateAuctionInputs,
    },
    AnyoneBids {
        inputs: BidInputs,
    },
    AdminAcceptsBid {
        inputs: AuctionInputs,
    },
    AdminCancelsAuction {
        inputs: AuctionInputs,
    },
    AdminSetsPayAddr {
        inputs: SetPayAddrInputs,
    },
    AnyonePaysFunds {
        inputs: AuctionInputs,
    },
    AnyoneSendsItemToWinner {
        inputs: SendItemInputs,
    },
}

impl AuctionTxInputs {
    pub fn kind(&self) -> AuctionTxKind {
        match self {
            AuctionTxInputs::AdminCreatesAuction { .. } => AuctionTxKind::AdminCreatesAuction,
            AuctionTxInputs::AnyoneBids { .. } => AuctionTxKind::AnyoneBids,
            AuctionTxInputs::AdminAcceptsBid { .. } => AuctionTxKind::AdminAcceptsBid,
            AuctionTxInputs::AdminCancelsAuction { .. } => AuctionTxKind::AdminCancelsAuction,
            AuctionTxInputs::AdminSetsPayAddr { .. } => AuctionTxKind::AdminSetsPayAddr,
            AuctionTxInputs::AnyonePaysFunds { .. } => AuctionTxKind::AnyonePaysFunds,
            AuctionTxInputs::AnyoneSendsItemToWinner { .. } => {
                AuctionTxKind::AnyoneSendsItemToWinner
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionInputs {
    pub currency_type: String,
    pub name: String,
    pub description: String,
    /// Empty when the transaction shape does not reveal the items; fetch
    /// them from the auction object instead
    pub item_addresses: Vec<String>,
    pub payout_address: String,
    pub begin_delay_ms: u64,
    pub duration_ms: u64,
    pub minimum_bid: u128,
    pub minimum_increase_bps: u64,
    pub extension_period_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidInputs {
    pub currency_type: String,
    pub auction_address: String,
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionInputs {
    pub currency_type: String,
    pub auction_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPayAddrInputs {
    pub currency_type: String,
    pub auction_address: String,
    pub payout_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendItemInputs {
    pub currency_type: String,
    pub item_type: String,
    pub auction_address: String,
    pub item_address: String,
}

/// Side-channel commands seen so far in the scan
#[derive(Debug, Default)]
struct ScanState<'a> {
    /// Amounts of the last `SplitCoins`
    last_split: Option<&'a [Argument]>,
    /// Last `0x1::vector::length<address>` call
    last_vector_length: Option<&'a MoveCall>,
}

/// Where the item addresses of a create call came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAddressSource {
    /// Passed directly as a `vector<address>` argument
    DirectVector,
    /// BCS bytes fed to a preceding `vector::length<address>` call
    BcsSideChannel,
    /// Not recoverable from the transaction
    Unknown,
}

/// Resolves call arguments against the transaction inputs
///
/// Positions count transaction inputs only. Coins and other values produced
/// by earlier commands arrive as results and are skipped.
struct CallArgs<'a> {
    call: &'a MoveCall,
    positions: Vec<u16>,
    inputs: &'a [TxInput],
}

impl<'a> CallArgs<'a> {
    fn new(call: &'a MoveCall, ptb: &'a ProgrammableTransaction) -> Self {
        let positions = call
            .arguments
            .iter()
            .filter_map(|arg| match arg {
                Argument::Input(i) => Some(*i),
                _ => None,
            })
            .collect();
        Self {
            call,
            positions,
            inputs: &ptb.inputs,
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn expect_len(&self, expected: usize) -> Result<(), DecodeError> {
        if self.len() != expected {
            return Err(DecodeError::shape(format!(
                "{} expects {} inputs, got {}",
                self.call,
                expected,
                self.len()
            )));
        }
        Ok(())
    }

    /// Calls whose only decoded input is the auction itself
    fn auction(&self, expected: usize) -> Result<AuctionInputs, DecodeError> {
        self.expect_len(expected)?;
        Ok(AuctionInputs {
            currency_type: self.type_arg(0)?,
            auction_address: self.id(0)?,
        })
    }

    fn type_arg(&self, idx: usize) -> Result<String, DecodeError> {
        self.call.type_arguments.get(idx).cloned().ok_or_else(|| {
            DecodeError::shape(format!("{} is missing type argument {}", self.call, idx))
        })
    }

    fn input(&self, idx: usize) -> Result<&'a TxInput, DecodeError> {
        let position = self.positions.get(idx).ok_or_else(|| {
            DecodeError::argument(format!("{} has no input {}", self.call, idx))
        })?;
        self.inputs
            .get(usize::from(*position))
            .ok_or_else(|| DecodeError::argument(format!("input {} does not exist", position)))
    }

    fn pure(&self, idx: usize) -> Result<&'a Value, DecodeError> {
        match self.input(idx)? {
            TxInput::Pure(pure) => Ok(&pure.value),
            TxInput::Object(_) => Err(DecodeError::argument(format!(
                "{} argument {} is an object, expected a pure value",
                self.call, idx
            ))),
        }
    }

    /// Object id or address; objects are passed by reference, addresses as pure values
    fn id(&self, idx: usize) -> Result<String, DecodeError> {
        match self.input(idx)? {
            TxInput::Object(object) => Ok(object.object_id.clone()),
            TxInput::Pure(pure) => json_string(&pure.value).ok_or_else(|| self.bad(idx, "an id")),
        }
    }

    fn string(&self, idx: usize) -> Result<String, DecodeError> {
        json_string(self.pure(idx)?).ok_or_else(|| self.bad(idx, "a string"))
    }

    fn u64(&self, idx: usize) -> Result<u64, DecodeError> {
        json_u64(self.pure(idx)?).ok_or_else(|| self.bad(idx, "a u64"))
    }

    fn u128(&self, idx: usize) -> Result<u128, DecodeError> {
        json_u128(self.pure(idx)?).ok_or_else(|| self.bad(idx, "an integer"))
    }

    fn string_vec(&self, idx: usize) -> Result<Vec<String>, DecodeError> {
        json_string_vec(self.pure(idx)?).ok_or_else(|| self.bad(idx, "a vector of addresses"))
    }

    fn bad(&self, idx: usize, expected: &str) -> DecodeError {
        DecodeError::argument(format!(
            "{} argument {} is not {}",
            self.call, idx, expected
        ))
    }
}

fn resolve_input<'a>(arg: &Argument, inputs: &'a [TxInput]) -> Result<&'a TxInput, DecodeError> {
    match arg {
        Argument::Input(i) => inputs
            .get(usize::from(*i))
            .ok_or_else(|| DecodeError::argument(format!("input {} does not exist", i))),
        other => Err(DecodeError::argument(format!(
            "{:?} is not a transaction input",
            other
        ))),
    }
}

/// `0x1::vector::length<address>`, used only to smuggle item addresses as BCS
fn is_address_vector_length(call: &MoveCall) -> bool {
    normalize_address(&call.package) == normalize_address("0x1")
        && call.module == "vector"
        && call.function == "length"
        && call.type_arguments.len() == 1
        && call.type_arguments[0] == "address"
}

/// Classifies transactions of one auction deployment
#[derive(Debug, Clone)]
pub struct AuctionTxParser {
    package_id: String,
    module: String,
}

impl AuctionTxParser {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            module: DEFAULT_MODULE.to_string(),
        }
    }

    /// Override the module name holding the entry functions
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Classify a transaction, or `None` if it is not a clean auction operation
    pub fn parse(&self, resp: &TxResponse) -> Option<AuctionTransaction> {
        match self.try_parse(resp) {
            Ok(tx) => Some(tx),
            Err(e) if e.is_inconsistent() => {
                tracing::warn!(digest = %resp.digest, "Skipping auction transaction: {}", e);
                None
            }
            Err(e) => {
                tracing::debug!(digest = %resp.digest, "Not an auction transaction: {}", e);
                None
            }
        }
    }

    /// Classify every transaction, dropping the ones that do not decode
    pub fn parse_many(&self, responses: &[TxResponse]) -> Vec<AuctionTransaction> {
        responses.iter().filter_map(|resp| self.parse(resp)).collect()
    }

    /// Classify a transaction, reporting why it was rejected
    pub fn try_parse(&self, resp: &TxResponse) -> Result<AuctionTransaction, DecodeError> {
        if !resp.is_success() {
            return Err(DecodeError::shape("execution status is not success"));
        }
        let ptb = resp
            .programmable()
            .ok_or_else(|| DecodeError::shape("not a programmable transaction"))?;
        let sender = resp
            .sender()
            .ok_or_else(|| DecodeError::shape("missing sender"))?;

        let mut scan = ScanState::default();
        for command in &ptb.transactions {
            match command {
                Command::SplitCoins(_, amounts) => scan.last_split = Some(amounts.as_slice()),
                Command::MoveCall(call) if is_address_vector_length(call) => {
                    scan.last_vector_length = Some(call)
                }
                Command::MoveCall(call) => {
                    if let Some(kind) = self.recognize(call) {
                        let inputs = self.decode_call(kind, call, ptb, &scan, resp)?;
                        return Ok(AuctionTransaction {
                            digest: resp.digest.clone(),
                            timestamp_ms: resp.timestamp_ms,
                            sender_address: sender.to_string(),
                            inputs,
                        });
                    }
                }
                _ => {}
            }
        }

        Err(DecodeError::shape("no recognized auction call"))
    }

    fn recognize(&self, call: &MoveCall) -> Option<AuctionTxKind> {
        if call.module != self.module
            || normalize_address(&call.package) != normalize_address(&self.package_id)
        {
            return None;
        }
        AuctionTxKind::from_function(&call.function)
    }

    fn decode_call(
        &self,
        kind: AuctionTxKind,
        call: &MoveCall,
        ptb: &ProgrammableTransaction,
        scan: &ScanState,
        resp: &TxResponse,
    ) -> Result<AuctionTxInputs, DecodeError> {
        let args = CallArgs::new(call, ptb);

        let inputs = match kind {
            AuctionTxKind::AdminCreatesAuction => {
                return self.decode_create(&args, ptb, scan, resp);
            }
            AuctionTxKind::AnyoneBids => {
                args.expect_len(2)?;
                AuctionTxInputs::AnyoneBids {
                    inputs: BidInputs {
                        currency_type: args.type_arg(0)?,
                        auction_address: args.id(0)?,
                        amount: bid_amount(scan, ptb)?,
                    },
                }
            }
            AuctionTxKind::AdminAcceptsBid => AuctionTxInputs::AdminAcceptsBid {
                inputs: args.auction(2)?,
            },
            AuctionTxKind::AdminCancelsAuction => AuctionTxInputs::AdminCancelsAuction {
                inputs: args.auction(2)?,
            },
            AuctionTxKind::AnyonePaysFunds => AuctionTxInputs::AnyonePaysFunds {
                inputs: args.auction(2)?,
            },
            AuctionTxKind::AdminSetsPayAddr => {
                args.expect_len(3)?;
                AuctionTxInputs::AdminSetsPayAddr {
                    inputs: SetPayAddrInputs {
                        currency_type: args.type_arg(0)?,
                        auction_address: args.id(0)?,
                        payout_address: args.id(1)?,
                    },
                }
            }
            AuctionTxKind::AnyoneSendsItemToWinner => {
                args.expect_len(3)?;
                AuctionTxInputs::AnyoneSendsItemToWinner {
                    inputs: SendItemInputs {
                        currency_type: args.type_arg(0)?,
                        item_type: args.type_arg(1)?,
                        auction_address: args.id(0)?,
                        item_address: args.id(1)?,
                    },
                }
            }
        };

        Ok(inputs)
    }

    fn decode_create(
        &self,
        args: &CallArgs,
        ptb: &ProgrammableTransaction,
        scan: &ScanState,
        resp: &TxResponse,
    ) -> Result<AuctionTxInputs, DecodeError> {
        let layout = create_auction_layout(args.len()).ok_or_else(|| {
            DecodeError::shape(format!(
                "{} has {} arguments, no known layout",
                args.call,
                args.len()
            ))
        })?;

        let (item_addresses, source) = item_addresses(args, layout, scan, ptb)?;
        tracing::trace!(digest = %resp.digest, ?source, "Resolved item addresses");

        let inputs = CreateAuctionInputs {
            currency_type: args.type_arg(0)?,
            name: args.string(layout.name)?,
            description: args.string(layout.description)?,
            item_addresses,
            payout_address: args.id(layout.pay_addr)?,
            begin_delay_ms: args.u64(layout.begin_delay_ms)?,
            duration_ms: args.u64(layout.duration_ms)?,
            minimum_bid: args.u128(layout.minimum_bid)?,
            minimum_increase_bps: args.u64(layout.minimum_increase_bps)?,
            extension_period_ms: args.u64(layout.extension_period_ms)?,
        };

        let auction_id = self.created_auction_id(resp)?;

        Ok(AuctionTxInputs::AdminCreatesAuction { auction_id, inputs })
    }

    /// The auction id only exists once the call has run, so it comes from the effects
    fn created_auction_id(&self, resp: &TxResponse) -> Result<String, DecodeError> {
        let mut created = resp.object_changes().iter().filter(|change| {
            change.kind == ObjectChangeKind::Created
                && change
                    .object_type
                    .as_deref()
                    .is_some_and(|t| {
                        ObjectCategory::Auction.matches(&self.package_id, &self.module, t)
                    })
        });

        match (created.next(), created.next()) {
            (Some(change), None) => change
                .object_id
                .clone()
                .ok_or_else(|| DecodeError::inconsistent("created auction has no object id")),
            (None, _) => Err(DecodeError::inconsistent(
                "create call without a created auction object",
            )),
            (Some(_), Some(_)) => Err(DecodeError::inconsistent(
                "create call with more than one created auction object",
            )),
        }
    }
}

/// Bid amount: the coin passed to the bid is split off just before it
fn bid_amount(scan: &ScanState, ptb: &ProgrammableTransaction) -> Result<u128, DecodeError> {
    let amounts = scan
        .last_split
        .ok_or_else(|| DecodeError::inconsistent("bid without a preceding SplitCoins"))?;

    let [amount] = amounts else {
        return Err(DecodeError::inconsistent(format!(
            "bid SplitCoins has {} amounts, expected 1",
            amounts.len()
        )));
    };

    match resolve_input(amount, &ptb.inputs)? {
        TxInput::Pure(pure) => json_u128(&pure.value)
            .ok_or_else(|| DecodeError::argument("SplitCoins amount is not an integer")),
        TxInput::Object(_) => Err(DecodeError::argument("SplitCoins amount is an object")),
    }
}

/// Recover item addresses, trying each known transaction shape in order
fn item_addresses(
    args: &CallArgs,
    layout: &CreateAuctionLayout,
    scan: &ScanState,
    ptb: &ProgrammableTransaction,
) -> Result<(Vec<String>, ItemAddressSource), DecodeError> {
    if let Some(addrs) = items_from_direct_vector(args, layout)? {
        return Ok((addrs, ItemAddressSource::DirectVector));
    }
    if let Some(addrs) = items_from_side_channel(scan, ptb)? {
        return Ok((addrs, ItemAddressSource::BcsSideChannel));
    }
    Ok((Vec::new(), ItemAddressSource::Unknown))
}

fn items_from_direct_vector(
    args: &CallArgs,
    layout: &CreateAuctionLayout,
) -> Result<Option<Vec<String>>, DecodeError> {
    layout.item_addrs.map(|idx| args.string_vec(idx)).transpose()
}

fn items_from_side_channel(
    scan: &ScanState,
    ptb: &ProgrammableTransaction,
) -> Result<Option<Vec<String>>, DecodeError> {
    let Some(call) = scan.last_vector_length else {
        return Ok(None);
    };

    let [arg] = call.arguments.as_slice() else {
        return Err(DecodeError::argument(format!(
            "{} has {} arguments, expected 1",
            call,
            call.arguments.len()
        )));
    };

    let value = match resolve_input(arg, &ptb.inputs)? {
        TxInput::Pure(pure) => &pure.value,
        TxInput::Object(_) => {
            return Err(DecodeError::argument("vector::length input is an object"));
        }
    };

    // Typed inputs come back as an address array, untyped ones as raw bytes
    if let Some(addrs) = json_string_vec(value) {
        return Ok(Some(addrs));
    }
    let bytes = json_bytes(value).ok_or_else(|| {
        DecodeError::argument("vector::length input is neither addresses nor raw bytes")
    })?;
    bcs_addresses(&bytes).map(Some)
}
