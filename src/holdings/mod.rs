// Module declarations
pub(crate) mod holdings_model;
pub(crate) mod holdings_traits;

// Re-export the public interface
pub use holdings_model::{Holding, HoldingDraft};
pub use holdings_traits::HoldingRepositoryTrait;
