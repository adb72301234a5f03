//! HTTP transport for the category store and the cleaning pipeline.
//!
//! Routes:
//! - `GET /category`, `POST /category`, `DELETE /category/:category`
//! - `POST /data`, `GET /data`
//! - `GET /category/health`, `GET /data/health`, `GET /healthz`

use axum::{
    extract::{Path, State},
    http::{header, uri::Authority, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use datacleaner_core::{
    clean::DataCleaner,
    errors::CoreError,
    model::{CategoryAndSubcat, CategoryCleanResponse},
    traits::CategoryStore,
    validate::normalize_category,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const CATEGORY_SERVICE: &str = "Category";
const DATA_SERVICE: &str = "Data";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
}

/// Failure of a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Core(e) => (StatusCode::BAD_REQUEST, e.code()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL"),
        };
        let message = self.to_string();
        if status.is_server_error() {
            error!(%code, %message, "request failed");
        } else {
            warn!(%code, %message, "request rejected");
        }
        (status, Json(json!({ "code": code, "message": message }))).into_response()
    }
}

pub struct Server<S> {
    store: Arc<S>,
    cleaner: DataCleaner<S>,
}

impl<S> Clone for Server<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cleaner: self.cleaner.clone(),
        }
    }
}

impl<S> Server<S>
where
    S: CategoryStore + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    #[must_use]
    pub fn from_shared(store: Arc<S>) -> Self {
        let cleaner = DataCleaner::new(Arc::clone(&store));
        Self { store, cleaner }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/category",
                get(list_categories::<S>).post(add_category::<S>),
            )
            .route("/category/health", get(category_health))
            .route("/category/:category", delete(delete_category::<S>))
            .route("/data", get(sample_data).post(clean_data::<S>))
            .route("/data/health", get(data_health))
            .route("/healthz", get(healthz))
            .with_state(self.clone())
    }

    /// Serves on an already bound listener until `shutdown` is cancelled.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::Io(e.to_string()))?;
        info!(addr = %local, "http server listening");
        let token = shutdown.child_token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                token.cancelled().await;
            })
            .await
            .map_err(|e| ServerError::Io(e.to_string()))?;
        info!("http server stopped");
        Ok(())
    }

    pub async fn run_http(&self, addr: &str) -> Result<(), ServerError> {
        let bind_addr: SocketAddr = addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::Parse(e.to_string()))?;
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| ServerError::Io(e.to_string()))?;

        let shutdown = CancellationToken::new();
        let server = self.serve(listener, shutdown.clone());
        tokio::pin!(server);

        tokio::select! {
            res = &mut server => res,
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl_c received; shutting down http server");
                shutdown.cancel();
                server.as_mut().await
            }
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

async fn list_categories<S>(
    State(server): State<Server<S>>,
) -> Result<Json<Vec<String>>, ApiError>
where
    S: CategoryStore + Send + Sync + 'static,
{
    let store = Arc::clone(&server.store);
    let set = run_blocking(move || store.categories()).await?;
    let mut names: Vec<String> = set.into_iter().collect();
    names.sort();
    Ok(Json(names))
}

async fn add_category<S>(
    State(server): State<Server<S>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ApiError>
where
    S: CategoryStore + Send + Sync + 'static,
{
    let raw = category_from_body(&body);
    let category = normalize_category(Some(raw.as_str())).map_err(CoreError::from)?;
    let location = category_location(&headers, &category);
    let store = Arc::clone(&server.store);
    let name = category.clone();
    run_blocking(move || store.add(&name)).await?;
    debug!(%category, %location, "category created");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

async fn delete_category<S>(
    State(server): State<Server<S>>,
    Path(category): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: CategoryStore + Send + Sync + 'static,
{
    let store = Arc::clone(&server.store);
    run_blocking(move || store.delete(&category)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clean_data<S>(
    State(server): State<Server<S>>,
    Json(input): Json<Option<Vec<CategoryAndSubcat>>>,
) -> Result<Json<CategoryCleanResponse>, ApiError>
where
    S: CategoryStore + Send + Sync + 'static,
{
    let cleaner = server.cleaner.clone();
    let response = run_blocking(move || cleaner.process(input.as_deref())).await?;
    Ok(Json(response))
}

async fn sample_data() -> Json<Vec<CategoryAndSubcat>> {
    Json(
        (1..=3)
            .map(|n| CategoryAndSubcat::new(&format!("CATEGORY {n}"), &format!("SUBCATEGORY {n}")))
            .collect(),
    )
}

async fn category_health() -> Json<String> {
    Json(health_message(CATEGORY_SERVICE))
}

async fn data_health() -> Json<String> {
    Json(health_message(DATA_SERVICE))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({"ok": true}))
}

fn health_message(service: &str) -> String {
    format!("{service} service up and running")
}

/// The body is the bare category name; a JSON string literal is unwrapped.
fn category_from_body(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_owned())
}

/// Characters escaped in the category path segment, besides controls.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Dot-only names are fully escaped so clients do not resolve them as
/// relative path segments.
fn encode_segment(category: &str) -> String {
    if category.chars().all(|c| c == '.') {
        return category.replace('.', "%2E");
    }
    utf8_percent_encode(category, SEGMENT).to_string()
}

fn category_location(headers: &HeaderMap, category: &str) -> String {
    let authority = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.parse::<Authority>().ok());
    let host = match authority {
        Some(a) => match a.port_u16() {
            Some(port) => format!("{}:{port}", a.host()),
            None => a.host().to_owned(),
        },
        None => "localhost".to_owned(),
    };
    format!("http://{host}/category/{}", encode_segment(category))
}
