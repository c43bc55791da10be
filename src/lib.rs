pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod rpc;
