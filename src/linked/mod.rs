// Module declarations
pub(crate) mod linked_model;
pub(crate) mod linked_service;

// Re-export the public interface
pub use linked_model::{NewLinkedAccount, WebhookOutcome};
pub use linked_service::LinkedAccountService;
