// Inventory write rules: add-or-merge by name, metadata edits by id
pub mod reconciliation;

// Detector output to per-label upserts
pub mod detection;

// Dashboard figures computed from the store
pub mod stats;
