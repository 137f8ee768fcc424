//! Table HTTP Routes
//!
//! Endpoints for table creation, row appends, column changes and listing.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{CatalogResult, CatalogService, TablePage};
use crate::schema::{ColumnDraft, Table};

use super::errors::{ApiError, ApiJson, ApiQuery, ApiResult};

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnDraft>>,
}

#[derive(Debug, Deserialize)]
pub struct AddRowRequest {
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveColumnRequest {
    #[serde(default)]
    pub column_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTablesQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

// ==================
// Table Routes
// ==================

/// Create table routes
pub fn table_routes(catalog: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/tables", get(list_tables_handler).post(create_table_handler))
        .route(
            "/tables/:table_id",
            get(get_table_handler).delete(delete_table_handler),
        )
        .route("/tables/:table_id/rows", post(add_row_handler))
        .route(
            "/tables/:table_id/columns",
            post(add_column_handler).patch(remove_column_handler),
        )
        .with_state(catalog)
}

/// Runs a catalog call on the blocking pool; the file store does disk I/O.
async fn run_catalog<T, F>(catalog: Arc<CatalogService>, op: F) -> ApiResult<T>
where
    F: FnOnce(&CatalogService) -> CatalogResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(&catalog))
        .await
        .map_err(|e| ApiError::Internal(format!("catalog task failed: {}", e)))?;
    Ok(result?)
}

/// Path ids that are not UUIDs cannot name a table.
fn parse_table_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::try_parse(raw).map_err(|_| ApiError::NotFound("Table not found".into()))
}

// ==================
// Handlers
// ==================

async fn create_table_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiJson(request): ApiJson<CreateTableRequest>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let (Some(name), Some(columns)) = (request.name, request.columns) else {
        return Err(ApiError::bad_request("Name and columns array are required"));
    };

    let table = run_catalog(catalog, move |c| c.tables.create_table(&name, columns)).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn get_table_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Table>> {
    let table_id = parse_table_id(&table_id)?;
    let table = run_catalog(catalog, move |c| c.tables.get_table(table_id)).await?;
    Ok(Json(table))
}

async fn delete_table_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(table_id): Path<String>,
) -> ApiResult<StatusCode> {
    let table_id = parse_table_id(&table_id)?;
    run_catalog(catalog, move |c| c.tables.delete_table(table_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_row_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(table_id): Path<String>,
    ApiJson(request): ApiJson<AddRowRequest>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let table_id = parse_table_id(&table_id)?;
    let data = match request.data {
        Some(Value::Null) | None => return Err(ApiError::bad_request("Data object is required")),
        Some(data) => data,
    };

    let table = run_catalog(catalog, move |c| c.tables.add_row(table_id, &data)).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn add_column_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(table_id): Path<String>,
    ApiJson(column): ApiJson<ColumnDraft>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    let table_id = parse_table_id(&table_id)?;
    let table = run_catalog(catalog, move |c| c.columns.add_column(table_id, column)).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn remove_column_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(table_id): Path<String>,
    ApiJson(request): ApiJson<RemoveColumnRequest>,
) -> ApiResult<Json<Table>> {
    let table_id = parse_table_id(&table_id)?;
    let column_name = request.column_name.unwrap_or_default();
    let table = run_catalog(catalog, move |c| {
        c.columns.remove_column(table_id, &column_name)
    })
    .await?;
    Ok(Json(table))
}

async fn list_tables_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiQuery(query): ApiQuery<ListTablesQuery>,
) -> ApiResult<Json<TablePage>> {
    let page = run_catalog(catalog, move |c| c.listing.list_tables(query.limit, query.skip)).await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::storage::MemoryTableStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let catalog = CatalogService::new(
            Arc::new(MemoryTableStore::new()),
            &ServiceConfig::default(),
        );
        table_routes(Arc::new(catalog))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_create_table_requires_columns() {
        let app = app();
        let (status, body) = send(&app, "POST", "/tables", Some(json!({"name": "Tasks"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Name and columns array are required"}));
    }

    #[tokio::test]
    async fn test_create_table_untyped_column() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/tables",
            Some(json!({"name": "Tasks", "columns": [{"name": "done"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Columns must have name and type");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_body() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/tables")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_row_requires_data() {
        let app = app();
        let (_, table) = send(
            &app,
            "POST",
            "/tables",
            Some(json!({"name": "Tasks", "columns": []})),
        )
        .await;
        let uri = format!("/tables/{}/rows", table["id"].as_str().unwrap());

        let (status, body) = send(&app, "POST", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Data object is required");
    }

    #[tokio::test]
    async fn test_non_uuid_table_id_is_not_found() {
        let app = app();
        let (status, body) = send(&app, "GET", "/tables/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Table not found");
    }

    #[tokio::test]
    async fn test_remove_column_requires_name() {
        let app = app();
        let (_, table) = send(
            &app,
            "POST",
            "/tables",
            Some(json!({"name": "Tasks", "columns": []})),
        )
        .await;
        let uri = format!("/tables/{}/columns", table["id"].as_str().unwrap());

        let (status, body) = send(&app, "PATCH", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Column name is required");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_query() {
        let app = app();
        let (status, _) = send(&app, "GET", "/tables?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "GET", "/tables?limit=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn test_delete_table() {
        let app = app();
        let (_, table) = send(
            &app,
            "POST",
            "/tables",
            Some(json!({"name": "Tasks", "columns": []})),
        )
        .await;
        let uri = format!("/tables/{}", table["id"].as_str().unwrap());

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_routes_over_file_store() {
        use crate::storage::FileTableStore;

        let temp = tempfile::TempDir::new().unwrap();
        let store = FileTableStore::open(temp.path()).unwrap();
        let catalog = CatalogService::new(Arc::new(store), &ServiceConfig::default());
        let app = table_routes(Arc::new(catalog));

        let (status, table) = send(
            &app,
            "POST",
            "/tables",
            Some(json!({"name": "Tasks", "columns": [{"name": "done", "type": "checkbox"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/tables/{}/rows", table["id"].as_str().unwrap());
        let (status, table) = send(
            &app,
            "POST",
            &uri,
            Some(json!({"data": {"name": "Buy milk", "done": true}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(table["rows"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_catalog_task_is_internal_error() {
        let catalog = Arc::new(CatalogService::new(
            Arc::new(MemoryTableStore::new()),
            &ServiceConfig::default(),
        ));
        let err = run_catalog(catalog, |_| -> CatalogResult<()> { panic!("store exploded") })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
