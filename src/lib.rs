pub mod constants;
pub mod errors;

pub mod adapters;
pub mod aggregation;
pub mod cipher;
pub mod history;
pub mod holdings;
pub mod linked;
pub mod manual_assets;
pub mod portfolios;
pub mod providers;
pub mod snapshots;
pub mod store;
pub mod sync;
pub mod wallets;

pub use errors::{Error, Result};
