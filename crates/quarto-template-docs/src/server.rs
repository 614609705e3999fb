//! HTTP server setup and routing

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use quarto_gotemplate::TreeSet;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::DocsConfig;
use crate::error::{Error, Result};
use crate::functions::FuncMap;
use crate::index::{IndexPage, SourceIndex};
use crate::layout::render_page;
use crate::source::load_source_dir;

/// Builds a complete page from scratch. Called once per request.
type RenderFn = Arc<dyn Fn() -> Result<String> + Send + Sync>;

#[derive(Clone)]
struct PageState {
    render: RenderFn,
}

/// Router serving the page for template sets assembled by `provider`.
///
/// The provider is called on every request, so edits made by whatever feeds
/// it show up on the next reload.
pub fn documentation_router<F>(provider: F) -> Router
where
    F: Fn() -> Result<(TreeSet, FuncMap)> + Send + Sync + 'static,
{
    build_router(Arc::new(move || {
        let (templates, functions) = provider()?;
        render_page(&IndexPage::new(&templates, &functions))
    }))
}

/// Router serving the page for the template files in `directory`.
///
/// Sources are re-read on every request.
pub fn source_router(directory: PathBuf, extensions: Vec<String>) -> Router {
    build_router(Arc::new(move || {
        let set = load_source_dir(&directory, &extensions)?;
        render_page(&SourceIndex::new(&set))
    }))
}

fn build_router(render: RenderFn) -> Router {
    Router::new()
        .route("/", get(page))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(PageState { render })
}

/// Documentation page handler
async fn page(State(state): State<PageState>) -> Response {
    let render = Arc::clone(&state.render);
    let result = tokio::task::spawn_blocking(move || render())
        .await
        .unwrap_or_else(|e| Err(Error::Server(e.to_string())));

    match result {
        Ok(html) => html_response(html),
        Err(err) => {
            warn!(error = %err, "Failed to build documentation page");
            error_response(&err)
        }
    }
}

/// 404 handler
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

fn html_response(html: String) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::CONTENT_LENGTH, HeaderValue::from(html.len())),
        ],
        html,
    )
        .into_response()
}

fn error_response(err: &Error) -> Response {
    (
        err.status_code(),
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        err.to_string(),
    )
        .into_response()
}

/// Run the documentation server over `config.directory`.
///
/// This function blocks until the server is shut down.
pub async fn run_server(config: DocsConfig) -> Result<()> {
    let addr = config.addr();
    let router = source_router(config.directory.clone(), config.extensions.clone());

    let listener = TcpListener::bind(&addr).await?;
    info!(
        %addr,
        directory = %config.directory.display(),
        extensions = ?config.extensions,
        "Template documentation server listening"
    );

    axum::serve(listener, router)
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    Ok(())
}
