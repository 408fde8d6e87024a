//! Fetch-then-decode helpers on top of a [`DataSource`]

use super::{DataSource, TxFilter};
use crate::parser::{AuctionTransaction, AuctionTxParser};
use crate::state::{ObjectPartition, partition_module_objects};
use crate::{Error, Result};
use std::collections::HashSet;

/// Walk every transaction that touched an auction and classify it
///
/// Transactions that are not auction operations are dropped, so the result
/// is the auction's event history in the order the source returned it.
pub async fn fetch_auction_history<S: DataSource + ?Sized>(
    source: &S,
    parser: &AuctionTxParser,
    auction_id: &str,
    page_size: usize,
) -> Result<Vec<AuctionTransaction>> {
    let filter = TxFilter::ChangedObject(auction_id.to_string());
    let mut cursor: Option<String> = None;
    let mut seen_cursors = HashSet::new();
    let mut seen_digests = HashSet::new();
    let mut history = Vec::new();
    let mut fetched = 0usize;

    loop {
        let page = source
            .query_transactions(&filter, cursor.as_deref(), page_size)
            .await?;
        fetched += page.data.len();

        for tx in parser.parse_many(&page.data) {
            if seen_digests.insert(tx.digest.clone()) {
                history.push(tx);
            }
        }

        match page.next_cursor {
            Some(next) if page.has_next_page => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(Error::data_source(format!(
                        "cursor {} returned twice for {}",
                        next, auction_id
                    )));
                }
                cursor = Some(next);
            }
            _ => break,
        }
    }

    tracing::info!(
        "Classified {} of {} transactions for auction {}",
        history.len(),
        fetched,
        auction_id
    );

    Ok(history)
}

/// Fetch auctions and items concurrently and partition them in one pass
///
/// Auctions are recognized by the parser's package and module.
pub async fn fetch_auctions_and_items<S: DataSource + ?Sized>(
    source: &S,
    parser: &AuctionTxParser,
    auction_ids: &[String],
    item_ids: &[String],
    observed_at_ms: u64,
) -> Result<ObjectPartition> {
    let (auctions, items) = tokio::join!(
        source.get_objects(auction_ids),
        source.get_objects(item_ids)
    );

    let mut snapshots = auctions?;
    snapshots.extend(items?);

    Ok(partition_module_objects(
        &snapshots,
        parser.package_id(),
        parser.module(),
        observed_at_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::file::tests::tx_touching;
    use crate::data_source::{
        Argument, Command, FileDataSource, MoveCall, ObjectSnapshot, Page, TxInput, TxKind,
        TxResponse,
    };
    use crate::parser::AuctionTxKind;
    use crate::state::auction::tests::auction_snapshot;
    use async_trait::async_trait;

    fn cancel_tx(digest: &str, auction: &str) -> TxResponse {
        let mut tx = tx_touching(digest, auction, None);
        if let Some(block) = tx.transaction.as_mut()
            && let TxKind::ProgrammableTransaction(ptb) = &mut block.data.transaction
        {
            ptb.inputs.push(TxInput::object("0x6"));
            ptb.transactions.push(Command::MoveCall(MoveCall {
                package: "0xpkg".to_string(),
                module: "auction".to_string(),
                function: "admin_cancels_auction".to_string(),
                type_arguments: vec!["0x2::sui::SUI".to_string()],
                arguments: vec![Argument::Input(0), Argument::Input(1)],
            }));
        }
        tx.object_changes = Some(vec![crate::data_source::ObjectChange {
            kind: crate::data_source::ObjectChangeKind::Mutated,
            object_type: Some("0xpkg::auction::Auction<0x2::sui::SUI>".to_string()),
            object_id: Some(auction.to_string()),
        }]);
        tx
    }

    #[tokio::test]
    async fn test_history_walks_all_pages() {
        let txs = vec![
            cancel_tx("d0", "0xa"),
            tx_touching("d1", "0xa", Some("0xa")),
            cancel_tx("d2", "0xb"),
            cancel_tx("d3", "0xa"),
        ];
        let source = FileDataSource::new(vec![], txs);

        let history = fetch_auction_history(&source, &AuctionTxParser::new("0xpkg"), "0xa", 1)
            .await
            .unwrap();

        assert_eq!(
            history.iter().map(|t| t.digest.as_str()).collect::<Vec<_>>(),
            vec!["d0", "d3"]
        );
        assert!(history.iter().all(|t| t.kind() == AuctionTxKind::AdminCancelsAuction));
    }

    struct LoopingSource;

    #[async_trait]
    impl DataSource for LoopingSource {
        async fn get_objects(&self, _ids: &[String]) -> Result<Vec<ObjectSnapshot>> {
            Ok(vec![])
        }

        async fn query_transactions(
            &self,
            _filter: &TxFilter,
            _cursor: Option<&str>,
            _limit: usize,
        ) -> Result<Page<TxResponse>> {
            Ok(Page {
                data: vec![],
                next_cursor: Some("same".to_string()),
                has_next_page: true,
            })
        }
    }

    #[tokio::test]
    async fn test_history_stops_on_repeated_cursor() {
        let err = fetch_auction_history(&LoopingSource, &AuctionTxParser::new("0xpkg"), "0xa", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }

    #[tokio::test]
    async fn test_fetch_auctions_and_items() {
        let item = ObjectSnapshot {
            object_id: "0xi1".to_string(),
            type_descriptor: "0xnft::card::Card".to_string(),
            fields: Default::default(),
            display: Default::default(),
        };
        let source = FileDataSource::new(vec![auction_snapshot("0xa1", "0x0", "0", 1), item], vec![]);

        let partition = fetch_auctions_and_items(
            &source,
            &AuctionTxParser::new("0xpkg"),
            &["0xa1".to_string()],
            &["0xi1".to_string(), "0xmissing".to_string()],
            0,
        )
        .await
        .unwrap();

        assert_eq!(partition.auctions.len(), 1);
        assert_eq!(partition.items.len(), 1);
        assert!(partition.item("0xi1").is_some());
    }
}
