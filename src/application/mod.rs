// Application layer - Use cases over the probe backend
pub mod account_service;
pub mod chart_service;
pub mod probe_repository;
pub mod probe_service;
pub mod response_guard;
pub mod settings_store;
pub mod streaming_service;
pub mod threshold_service;
