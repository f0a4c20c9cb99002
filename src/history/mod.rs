// Module declarations
pub(crate) mod history_model;
pub(crate) mod history_service;

// Re-export the public interface
pub use history_model::{
    HistoryPoint, HistoryRange, PortfolioDetail, PortfolioOverview, PortfolioSummary,
};
pub use history_service::HistoryService;
