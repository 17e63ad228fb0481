//! Core database infrastructure
//!
//! This module provides the foundational database components for pipeline stages:
//! - `DatabaseConn`: SQLite connection wrapper with configuration and liveness check
//! - `SchemaManager`: Schema initialization and version checking
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{
    SchemaDefinitions, SchemaManager, SchemaStatus, REQUIRED_TABLES, SCHEMA_VERSION,
};
