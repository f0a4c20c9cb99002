// Module declarations
pub(crate) mod snapshots_model;
pub(crate) mod snapshots_traits;

// Re-export the public interface
pub use snapshots_model::{
    NewPortfolioSnapshot, NewUserPortfolioSnapshot, PortfolioSnapshot, UserPortfolioSnapshot,
};
pub use snapshots_traits::{SnapshotRepositoryTrait, UserSnapshotRepositoryTrait};
