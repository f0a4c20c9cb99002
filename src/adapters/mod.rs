// Module declarations
pub(crate) mod linked_adapter;
pub(crate) mod manual;
pub(crate) mod registry;
pub(crate) mod source_adapter;
pub(crate) mod wallet_adapter;

// Re-export the public interface
pub use linked_adapter::LinkedAccountAdapter;
pub use manual::{normalize_manual_input, ManualAssetInput};
pub use registry::AdapterRegistry;
pub use source_adapter::{SourceError, SyncSource};
pub use wallet_adapter::{TokenConfig, WalletAdapter, WalletAdapterConfig};
