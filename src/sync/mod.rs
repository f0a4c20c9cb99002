// Module declarations
pub(crate) mod sync_service;
pub(crate) mod sync_traits;

// Re-export the public interface
pub use sync_service::SyncService;
pub use sync_traits::{SyncOutcome, SyncServiceTrait};
