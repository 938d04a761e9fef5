//! tally-core: normalized brokerage transaction types shared by every importer

pub mod config;
pub mod ids;
pub mod time;
pub mod transaction;

pub use config::{IngestConfig, load_config};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use time::SettlementClock;
pub use transaction::{Transaction, TransactionKind, CASH_TICKER};
