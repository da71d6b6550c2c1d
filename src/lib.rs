pub mod api;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod humanize;
pub mod inventory;
pub mod observability;
pub mod resolver;
pub mod upstream;
