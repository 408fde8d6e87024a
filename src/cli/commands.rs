//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::data_source::ObjectSnapshot;
use crate::{Result, bail};
use serde_json::Value;
use std::path::Path;

/// Read a saved RPC file: a single value, an array, or a query page
async fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&content)?;

    Ok(match value {
        Value::Array(values) => values,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(values)) => values,
            Some(data) => {
                map.insert("data".to_string(), data);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => bail!(
            "{}: expected a JSON object or array, got {}",
            path.display(),
            other
        ),
    })
}

/// Current wall-clock time in epoch milliseconds
fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Classify command implementation
pub mod classify {
    use super::*;
    use crate::Config;
    use crate::cli::{OutputFormat, output};
    use crate::data_source::file::decode_transactions;
    use crate::parser::AuctionTxParser;

    /// Execute the classify command
    pub async fn execute(
        file: &Path,
        output_format: OutputFormat,
        package_id: &str,
        config: &Config,
    ) -> Result<()> {
        let responses = decode_transactions(read_records(file).await?);

        tracing::info!("Classifying {} transactions", responses.len());

        let parser = AuctionTxParser::new(package_id).with_module(&config.auction.module);
        let transactions = parser.parse_many(&responses);

        tracing::info!("Found {} auction transactions", transactions.len());

        match output_format {
            OutputFormat::Json => output::transactions_json(&mut std::io::stdout(), &transactions),
            OutputFormat::Table => {
                output::transactions_table(&mut std::io::stdout(), &transactions)
            }
        }
    }
}

/// State command implementation
pub mod state {
    use super::*;
    use crate::Config;
    use crate::cli::{OutputFormat, output};
    use crate::state::partition_module_objects;

    /// Execute the state command
    pub async fn execute(
        file: &Path,
        at: Option<u64>,
        output_format: OutputFormat,
        package_id: &str,
        config: &Config,
    ) -> Result<()> {
        let snapshots: Vec<ObjectSnapshot> = read_records(file)
            .await?
            .iter()
            .filter_map(|v| match ObjectSnapshot::from_rpc(v) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!("Skipping object: {}", e);
                    None
                }
            })
            .collect();

        let observed_at_ms = at.unwrap_or_else(now_ms);
        tracing::debug!("Deriving state at {}", observed_at_ms);

        let partition =
            partition_module_objects(&snapshots, package_id, &config.auction.module, observed_at_ms);

        match output_format {
            OutputFormat::Json => output::partition_json(&mut std::io::stdout(), &partition),
            OutputFormat::Table => {
                output::partition_table(&mut std::io::stdout(), &partition, observed_at_ms)
            }
        }
    }
}

/// History command implementation
pub mod history {
    use super::*;
    use crate::Config;
    use crate::cli::{OutputFormat, output};
    use crate::data_source::create_data_source;
    use crate::data_source::history::{fetch_auction_history, fetch_auctions_and_items};
    use crate::parser::AuctionTxParser;
    use std::path::PathBuf;

    /// Execute the history command
    pub async fn execute(
        auction_id: &str,
        dump_dir: Option<PathBuf>,
        cache: bool,
        output_format: OutputFormat,
        package_id: &str,
        config: &Config,
    ) -> Result<()> {
        let source = create_data_source(config, dump_dir, cache || config.cache.enabled).await?;
        let parser = AuctionTxParser::new(package_id).with_module(&config.auction.module);

        tracing::info!("Fetching history of auction {}", auction_id);
        let transactions =
            fetch_auction_history(source.as_ref(), &parser, auction_id, config.data.page_size)
                .await?;

        let observed_at_ms = now_ms();
        let partition = fetch_auctions_and_items(
            source.as_ref(),
            &parser,
            &[auction_id.to_string()],
            &[],
            observed_at_ms,
        )
        .await?;

        // Items are only known once the auction itself has been decoded
        let item_ids = partition
            .auctions
            .first()
            .map(|a| a.item_addresses.clone())
            .unwrap_or_default();
        let items = fetch_auctions_and_items(
            source.as_ref(),
            &parser,
            &[],
            &item_ids,
            observed_at_ms,
        )
        .await?;

        let mut stdout = std::io::stdout();
        match output_format {
            OutputFormat::Json => {
                output::history_json(&mut stdout, &transactions, &partition, &items)
            }
            OutputFormat::Table => {
                if partition.auctions.is_empty() {
                    tracing::warn!("Auction {} not found in data source", auction_id);
                } else {
                    output::partition_table(&mut stdout, &partition, observed_at_ms)?;
                }
                output::partition_table(&mut stdout, &items, observed_at_ms)?;
                output::transactions_table(&mut stdout, &transactions)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn write_temp(name: &str, value: &Value) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sui-auction-{}-{}.json", name, std::process::id()));
        tokio::fs::write(&path, value.to_string()).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_read_records_shapes() {
        let path = write_temp("array", &json!([{ "digest": "a" }, { "digest": "b" }])).await;
        assert_eq!(read_records(&path).await.unwrap().len(), 2);

        let path = write_temp("page", &json!({ "data": [{ "digest": "a" }], "hasNextPage": false })).await;
        assert_eq!(read_records(&path).await.unwrap(), vec![json!({ "digest": "a" })]);

        let path = write_temp("object", &json!({ "data": { "objectId": "0x1" } })).await;
        assert_eq!(
            read_records(&path).await.unwrap(),
            vec![json!({ "data": { "objectId": "0x1" } })]
        );

        let path = write_temp("scalar", &json!(3)).await;
        assert!(matches!(read_records(&path).await, Err(crate::Error::Custom(_))));
    }

    #[tokio::test]
    async fn test_classify_survives_malformed_record() {
        use crate::data_source::file::tests::tx_touching;

        let records = json!([
            { "digest": 42 },
            serde_json::to_value(tx_touching("d0", "0xa", None)).unwrap(),
        ]);
        let path = write_temp("classify-mixed", &records).await;

        let result = classify::execute(
            &path,
            crate::cli::OutputFormat::Json,
            "0xpkg",
            &crate::Config::default(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_now_is_positive() {
        assert!(now_ms() > 1_600_000_000_000);
    }
}
