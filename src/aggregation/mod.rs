// Module declarations
pub(crate) mod aggregation_model;
pub(crate) mod aggregation_service;
pub(crate) mod aggregation_traits;

// Re-export the public interface
pub use aggregation_model::{AllocationSlice, DailyAggregationOutcome, HoldingView};
pub use aggregation_service::AggregationService;
pub use aggregation_traits::AggregationServiceTrait;
