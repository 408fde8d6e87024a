//! Data source backed by saved RPC responses
//!
//! A dump directory holds `objects.json`, an array of `SuiObjectResponse`
//! values, and `transactions.json`, an array of transaction responses as
//! returned by `suix_queryTransactionBlocks` with input, effects and object
//! changes enabled. Cursors are stringified offsets into the matching set.

use super::{DataSource, ObjectSnapshot, Page, TxFilter, TxInput, TxResponse};
use crate::parser::normalize_address;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub const OBJECTS_FILE: &str = "objects.json";
pub const TRANSACTIONS_FILE: &str = "transactions.json";

#[derive(Debug, Clone, Default)]
pub struct FileDataSource {
    objects: HashMap<String, ObjectSnapshot>,
    transactions: Vec<TxResponse>,
}

impl FileDataSource {
    pub fn new(objects: Vec<ObjectSnapshot>, transactions: Vec<TxResponse>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|o| (normalize_address(&o.object_id), o))
                .collect(),
            transactions,
        }
    }

    /// Load a dump directory; a missing file counts as empty
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::data_source(format!(
                "dump directory {} does not exist",
                dir.display()
            )));
        }

        let objects = match read_json_array(&dir.join(OBJECTS_FILE)).await? {
            Some(values) => values
                .iter()
                .filter_map(|v| match ObjectSnapshot::from_rpc(v) {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable object in dump: {}", e);
                        None
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let transactions = match read_json_array(&dir.join(TRANSACTIONS_FILE)).await? {
            Some(values) => decode_transactions(values),
            None => Vec::new(),
        };

        tracing::info!(
            objects = objects.len(),
            transactions = transactions.len(),
            "Loaded dump from {}",
            dir.display()
        );

        Ok(Self::new(objects, transactions))
    }

    fn matches(filter: &TxFilter, tx: &TxResponse) -> bool {
        let wanted = normalize_address(filter.object_id());
        match filter {
            TxFilter::InputObject(_) => tx.programmable().is_some_and(|ptb| {
                ptb.inputs.iter().any(|input| match input {
                    TxInput::Object(object) => normalize_address(&object.object_id) == wanted,
                    TxInput::Pure(_) => false,
                })
            }),
            TxFilter::ChangedObject(_) => tx.object_changes().iter().any(|change| {
                change
                    .object_id
                    .as_deref()
                    .is_some_and(|id| normalize_address(id) == wanted)
            }),
        }
    }
}

/// Decode transaction responses, skipping records that do not deserialize
pub fn decode_transactions(values: Vec<Value>) -> Vec<TxResponse> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<TxResponse>(value) {
            Ok(tx) => Some(tx),
            Err(e) => {
                tracing::warn!("Skipping unreadable transaction at index {}: {}", i, e);
                None
            }
        })
        .collect()
}

async fn read_json_array(path: &Path) -> Result<Option<Vec<Value>>> {
    if !path.exists() {
        tracing::debug!("{} not found, treating as empty", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(values) => Ok(Some(values)),
        _ => Err(Error::data_source(format!(
            "{} must hold a JSON array",
            path.display()
        ))),
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn get_objects(&self, ids: &[String]) -> Result<Vec<ObjectSnapshot>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                let found = self.objects.get(&normalize_address(id)).cloned();
                if found.is_none() {
                    tracing::debug!("Object {} not in dump", id);
                }
                found
            })
            .collect())
    }

    async fn query_transactions(
        &self,
        filter: &TxFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<TxResponse>> {
        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| Error::data_source(format!("invalid cursor {:?}", c)))?,
            None => 0,
        };

        let matching: Vec<&TxResponse> = self
            .transactions
            .iter()
            .filter(|tx| Self::matches(filter, tx))
            .collect();

        let end = start.saturating_add(limit.max(1)).min(matching.len());
        let data = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|tx| (*tx).clone())
            .collect();

        let has_next_page = end < matching.len();
        Ok(Page {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data_source::{
        ExecutionStatus, ObjectChange, ProgrammableTransaction, TxBlock, TxData, TxEffects, TxKind,
    };
    use serde_json::json;

    pub(crate) fn tx_touching(digest: &str, input: &str, created: Option<&str>) -> TxResponse {
        TxResponse {
            digest: digest.to_string(),
            timestamp_ms: Some(1),
            transaction: Some(TxBlock {
                data: TxData {
                    sender: "0xs".to_string(),
                    transaction: TxKind::ProgrammableTransaction(ProgrammableTransaction {
                        inputs: vec![TxInput::object(input)],
                        transactions: vec![],
                    }),
                },
            }),
            effects: Some(TxEffects {
                status: ExecutionStatus::Success,
            }),
            object_changes: Some(
                created
                    .map(|id| vec![ObjectChange::created("0xpkg::auction::Auction<0x2::sui::SUI>", id)])
                    .unwrap_or_default(),
            ),
        }
    }

    fn source() -> FileDataSource {
        let txs = (0..5)
            .map(|i| tx_touching(&format!("d{}", i), if i % 2 == 0 { "0xa" } else { "0xb" }, None))
            .collect();
        FileDataSource::new(vec![], txs)
    }

    #[tokio::test]
    async fn test_pagination() {
        let source = source();
        let filter = TxFilter::InputObject("0xa".to_string());

        let first = source.query_transactions(&filter, None, 2).await.unwrap();
        assert_eq!(
            first.data.iter().map(|t| t.digest.as_str()).collect::<Vec<_>>(),
            vec!["d0", "d2"]
        );
        assert!(first.has_next_page);

        let second = source
            .query_transactions(&filter, first.next_cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].digest, "d4");
        assert!(!second.has_next_page);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn test_filters_compare_full_width_ids() {
        let source = FileDataSource::new(vec![], vec![tx_touching("d0", "0xa", Some("0xC"))]);

        let page = source
            .query_transactions(
                &TxFilter::ChangedObject("0x000c".to_string()),
                None,
                10,
            )
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);

        let page = source
            .query_transactions(&TxFilter::InputObject("0xc".to_string()), None, 10)
            .await
            .unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let err = source()
            .query_transactions(&TxFilter::InputObject("0xa".to_string()), Some("x"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }

    #[tokio::test]
    async fn test_open_dump_directory() {
        let dir = std::env::temp_dir().join(format!("sui-auction-dump-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let objects = json!([
            { "data": { "objectId": "0xi1", "content": { "type": "0xnft::card::Card", "fields": {} } } },
            { "error": { "code": "notExists", "object_id": "0xgone" } }
        ]);
        let transactions = json!([
            serde_json::to_value(tx_touching("d0", "0xa", None)).unwrap(),
            { "digest": "broken", "transaction": 7 },
            serde_json::to_value(tx_touching("d1", "0xa", None)).unwrap(),
        ]);
        fs::write(dir.join(OBJECTS_FILE), objects.to_string()).await.unwrap();
        fs::write(dir.join(TRANSACTIONS_FILE), transactions.to_string()).await.unwrap();

        let source = FileDataSource::open(&dir).await.unwrap();
        let found = source
            .get_objects(&["0xi1".to_string(), "0xgone".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].object_id, "0xi1");

        let page = source
            .query_transactions(&TxFilter::InputObject("0xa".to_string()), None, 5)
            .await
            .unwrap();
        assert_eq!(
            page.data.iter().map(|t| t.digest.as_str()).collect::<Vec<_>>(),
            vec!["d0", "d1"]
        );

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_open_missing_directory() {
        assert!(FileDataSource::open("/nonexistent/sui-auction").await.is_err());
    }

    #[test]
    fn test_decode_transactions_skips_bad_records() {
        let values = vec![
            json!("not a transaction"),
            serde_json::to_value(tx_touching("d0", "0xa", None)).unwrap(),
            json!({ "timestampMs": "1" }),
        ];
        let txs = decode_transactions(values);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].digest, "d0");
    }
}
