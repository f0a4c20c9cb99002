// Module declarations
pub(crate) mod wallets_service;

// Re-export the public interface
pub use wallets_service::WalletService;
