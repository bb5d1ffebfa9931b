pub mod bootstrap;
pub mod config;
pub mod db;
pub mod mail;
pub mod security;
pub mod storage;
