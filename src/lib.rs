//! Sui Auction SDK
//!
//! Decodes the on-chain activity of a Sui auction package.
//!
//! This library provides functionality for:
//! - Classifying raw transaction responses into typed auction operations
//! - Deriving auction state and capability flags from object snapshots
//! - Partitioning fetched objects into auctions and plain items
//! - Reading saved RPC responses through a cached data source
//!
//! ```
//! use sui_auction_sdk::parser::currency_type_from_descriptor;
//!
//! let currency = currency_type_from_descriptor("0xpkg::auction::Auction<0x2::sui::SUI>");
//! assert_eq!(currency.as_deref(), Some("0x2::sui::SUI"));
//! ```

pub mod cli;
pub mod config;
pub mod data_source;
pub mod error;
pub mod parser;
pub mod state;

pub use config::Config;
pub use error::{DecodeError, Error, Result};
pub use parser::{AuctionTransaction, AuctionTxKind, AuctionTxParser};
pub use state::{AuctionState, ObjectPartition, derive_auction_state, partition_objects};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
