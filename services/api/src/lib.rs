pub mod adapters;
pub mod analytics;
pub mod config;
pub mod error;
pub mod extract;
pub mod web;
