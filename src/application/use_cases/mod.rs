pub mod auth;
pub mod catalog;
pub mod file_ingestion;
pub mod search;
pub mod upload;
