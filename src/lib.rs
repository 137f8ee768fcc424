//! tabula - user-defined tables with typed columns and validated rows
//!
//! A table is one aggregate: its column definitions plus every row stored
//! under them. Rows are validated against the columns on write, column
//! removal cascades into existing rows, and concurrent writers to the same
//! table are serialized with optimistic versioning.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod storage;
