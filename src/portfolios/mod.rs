// Module declarations
pub(crate) mod portfolios_model;
pub(crate) mod portfolios_traits;

// Re-export the public interface
pub use portfolios_model::{NewPortfolio, Portfolio, PortfolioKind, PortfolioStatus};
pub use portfolios_traits::PortfolioRepositoryTrait;
