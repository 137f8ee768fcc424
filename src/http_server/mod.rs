//! # Tabula HTTP Server Module
//!
//! Axum server exposing the table catalog as JSON over HTTP.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/tables` - Table creation and listing
//! - `/api/tables/:table_id` - Table fetch and delete
//! - `/api/tables/:table_id/rows` - Row append
//! - `/api/tables/:table_id/columns` - Column add (POST) and remove (PATCH)

pub mod errors;
pub mod health_routes;
pub mod server;
pub mod table_routes;

pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
