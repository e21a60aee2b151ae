pub mod adapters;
pub mod app_config;
pub mod commands;
pub mod entities;
pub mod ports;
pub mod queries;
pub mod task_registry;
