//! Core data models for Sui objects and transactions
//!
//! This module defines the raw shapes returned by the Sui JSON-RPC API,
//! trimmed to what the auction decoder reads. Everything deserializes
//! straight from RPC JSON, so saved responses can be replayed as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::error::DecodeError;
use crate::parser::{de_opt_u64, json_string};

/// Point-in-time read of an on-chain object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshot {
    /// Object id
    pub object_id: String,

    /// Full Move type, e.g. `0x2::coin::Coin<0x2::sui::SUI>`
    #[serde(rename = "type")]
    pub type_descriptor: String,

    /// Raw Move fields as returned by the RPC
    #[serde(default)]
    pub fields: Map<String, Value>,

    /// Object display metadata, if the RPC was asked for it
    #[serde(default)]
    pub display: HashMap<String, String>,
}

impl ObjectSnapshot {
    /// Build a snapshot from a `SuiObjectResponse` JSON value
    ///
    /// Accepts both the full response (`{ "data": { ... } }`) and the bare
    /// `data` object.
    pub fn from_rpc(response: &Value) -> Result<Self, DecodeError> {
        let data = response.get("data").unwrap_or(response);

        let object_id = data
            .get("objectId")
            .and_then(json_string)
            .ok_or_else(|| DecodeError::snapshot("missing objectId"))?;

        let content = data.get("content");
        let type_descriptor = content
            .and_then(|c| c.get("type"))
            .or_else(|| data.get("type"))
            .and_then(json_string)
            .ok_or_else(|| DecodeError::snapshot(format!("{}: missing type", object_id)))?;

        let fields = content
            .and_then(|c| c.get("fields"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let display = data
            .get("display")
            .and_then(|d| d.get("data"))
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| json_string(v).map(|s| (k.clone(), s)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            object_id,
            type_descriptor,
            fields,
            display,
        })
    }
}

/// Transaction as returned by `sui_getTransactionBlock` / `suix_queryTransactionBlocks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    /// Transaction digest
    pub digest: String,

    /// Checkpoint timestamp in epoch milliseconds
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp_ms: Option<u64>,

    /// Transaction input, present when `showInput` was requested
    pub transaction: Option<TxBlock>,

    /// Execution effects, present when `showEffects` was requested
    pub effects: Option<TxEffects>,

    /// Object changes, present when `showObjectChanges` was requested
    #[serde(default)]
    pub object_changes: Option<Vec<ObjectChange>>,
}

impl TxResponse {
    pub fn sender(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.data.sender.as_str())
    }

    pub fn programmable(&self) -> Option<&ProgrammableTransaction> {
        match &self.transaction.as_ref()?.data.transaction {
            TxKind::ProgrammableTransaction(ptb) => Some(ptb),
            TxKind::Other => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.effects.as_ref().map(|e| &e.status),
            Some(ExecutionStatus::Success)
        )
    }

    pub fn object_changes(&self) -> &[ObjectChange] {
        self.object_changes.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxBlock {
    pub data: TxData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxData {
    pub sender: String,
    pub transaction: TxKind,
}

/// Transaction kind; only programmable transactions carry auction calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TxKind {
    ProgrammableTransaction(ProgrammableTransaction),
    #[serde(other)]
    Other,
}

/// Programmable transaction block: shared inputs and an ordered command list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    #[serde(default)]
    pub inputs: Vec<TxInput>,

    #[serde(default)]
    pub transactions: Vec<Command>,
}

/// Transaction-level input referenced by `Argument::Input`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TxInput {
    Pure(PureInput),
    Object(ObjectInput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PureInput {
    /// Move type of the value; absent for untyped raw bytes
    #[serde(default)]
    pub value_type: Option<String>,

    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInput {
    pub object_id: String,

    /// Ownership kind (`immOrOwnedObject`, `sharedObject`, `receiving`)
    #[serde(default, rename = "objectType")]
    pub ownership: Option<String>,
}

impl TxInput {
    pub fn pure(value: Value) -> Self {
        TxInput::Pure(PureInput {
            value_type: None,
            value,
        })
    }

    pub fn typed(value_type: &str, value: Value) -> Self {
        TxInput::Pure(PureInput {
            value_type: Some(value_type.to_string()),
            value,
        })
    }

    pub fn object(object_id: &str) -> Self {
        TxInput::Object(ObjectInput {
            object_id: object_id.to_string(),
            ownership: Some("sharedObject".to_string()),
        })
    }
}

/// One command of a programmable transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(MoveCall),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
    TransferObjects(Vec<Argument>, Argument),
    MakeMoveVec(Option<String>, Vec<Argument>),
    Publish(Vec<String>),
    Upgrade(Vec<String>, String, Argument),
}

/// Move function invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,

    #[serde(default)]
    pub type_arguments: Vec<String>,

    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl fmt::Display for MoveCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Reference to a value inside a programmable transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

/// Execution status from the transaction effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure {
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxEffects {
    pub status: ExecutionStatus,
}

/// Object change recorded by a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: ObjectChangeKind,

    #[serde(default)]
    pub object_type: Option<String>,

    #[serde(default)]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectChangeKind {
    Created,
    Mutated,
    Deleted,
    Wrapped,
    Transferred,
    Published,
    #[serde(other)]
    Unknown,
}

impl ObjectChange {
    pub fn created(object_type: &str, object_id: &str) -> Self {
        Self {
            kind: ObjectChangeKind::Created,
            object_type: Some(object_type.to_string()),
            object_id: Some(object_id.to_string()),
        }
    }
}

/// One page of a cursor-paginated query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    pub fn last(data: Vec<T>) -> Self {
        Self {
            data,
            next_cursor: None,
            has_next_page: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tx_response_from_rpc_json() {
        let raw = json!({
            "digest": "9fzX",
            "timestampMs": "1712000000000",
            "transaction": {
                "data": {
                    "sender": "0xb0b",
                    "transaction": {
                        "kind": "ProgrammableTransaction",
                        "inputs": [
                            { "type": "pure", "valueType": "u64", "value": "500" },
                            { "type": "object", "objectType": "sharedObject", "objectId": "0xa1", "mutable": true }
                        ],
                        "transactions": [
                            { "SplitCoins": ["GasCoin", [{ "Input": 0 }]] },
                            { "MoveCall": {
                                "package": "0xpkg",
                                "module": "auction",
                                "function": "anyone_bids",
                                "type_arguments": ["0x2::sui::SUI"],
                                "arguments": [{ "Input": 1 }, { "NestedResult": [0, 0] }]
                            } }
                        ]
                    }
                }
            },
            "effects": { "status": { "status": "success" } },
            "objectChanges": [
                { "type": "mutated", "sender": "0xb0b", "objectType": "0xpkg::auction::Auction<0x2::sui::SUI>", "objectId": "0xa1" }
            ]
        });

        let tx: TxResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.timestamp_ms, Some(1_712_000_000_000));
        assert_eq!(tx.sender(), Some("0xb0b"));
        assert!(tx.is_success());

        let ptb = tx.programmable().unwrap();
        assert_eq!(ptb.inputs[1], TxInput::object("0xa1"));
        assert_eq!(
            ptb.transactions[0],
            Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)])
        );
        match &ptb.transactions[1] {
            Command::MoveCall(call) => {
                assert_eq!(call.to_string(), "0xpkg::auction::anyone_bids");
                assert_eq!(call.arguments[1], Argument::NestedResult(0, 0));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(tx.object_changes()[0].kind, ObjectChangeKind::Mutated);
    }

    #[test]
    fn test_non_programmable_and_failed_tx() {
        let raw = json!({
            "digest": "sys",
            "transaction": { "data": { "sender": "0x0", "transaction": { "kind": "ConsensusCommitPrologue", "epoch": "3" } } },
            "effects": { "status": { "status": "failure", "error": "InsufficientGas" } }
        });

        let tx: TxResponse = serde_json::from_value(raw).unwrap();
        assert!(tx.programmable().is_none());
        assert!(!tx.is_success());
        assert!(tx.object_changes().is_empty());
        assert_eq!(tx.timestamp_ms, None);
    }

    #[test]
    fn test_snapshot_from_rpc() {
        let raw = json!({
            "data": {
                "objectId": "0xabc",
                "version": "12",
                "content": {
                    "dataType": "moveObject",
                    "type": "0xnft::card::Card",
                    "fields": { "id": { "id": "0xabc" }, "power": "9" }
                },
                "display": { "data": { "name": "Ace", "image_url": "https://img/ace.png" }, "error": null }
            }
        });

        let snapshot = ObjectSnapshot::from_rpc(&raw).unwrap();
        assert_eq!(snapshot.object_id, "0xabc");
        assert_eq!(snapshot.type_descriptor, "0xnft::card::Card");
        assert_eq!(snapshot.fields.get("power"), Some(&json!("9")));
        assert_eq!(snapshot.display.get("name").map(String::as_str), Some("Ace"));
    }

    #[test]
    fn test_snapshot_from_rpc_without_type() {
        let raw = json!({ "data": { "objectId": "0xabc" } });
        let err = ObjectSnapshot::from_rpc(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedSnapshot(_)));
    }
}
