pub mod detections;
pub mod inventory;
pub mod stats;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

impl inventory::InventoryHandlerState for AppState {
    fn reconciliation(&self) -> &crate::services::reconciliation::ReconciliationService {
        &self.reconciliation
    }
}
