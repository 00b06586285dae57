// Soil probe dashboard gateway - Layered crate root
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
