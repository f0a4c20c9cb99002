// Module declarations
pub(crate) mod aggregator;
pub(crate) mod chain_rpc;
pub(crate) mod market_data;

// Re-export the public interface
pub use aggregator::{
    AggregatorClient, AggregatorError, AggregatorHolding, AggregatorHoldingsResponse,
    AggregatorSecurity, PlaidApiClient,
};
pub use chain_rpc::{ChainRpcClient, ChainRpcError, JsonRpcChainClient};
pub use market_data::{CoinGeckoProvider, MarketDataError, MarketDataProvider};
