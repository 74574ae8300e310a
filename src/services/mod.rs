pub mod current_service;
pub mod history_service;
pub mod ingestion_service;
pub mod stats_service;
