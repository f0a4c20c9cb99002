// Module declarations
pub(crate) mod manual_assets_model;
pub(crate) mod manual_assets_service;

// Re-export the public interface
pub use manual_assets_model::ManualAsset;
pub use manual_assets_service::ManualAssetService;
