use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use jogadores_domain::{ServiceError, page::Page, player::ArcPlayerService};
use log::{error, info};
use serde::Serialize;

mod jogador;

pub use jogador::{JogadorDto, JogadorQuery};

#[derive(Clone)]
pub struct AppState {
    pub player_service: ArcPlayerService,
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/api/jogadores", post(jogador::create).get(jogador::find))
        .route(
            "/api/jogadores/{id}",
            get(jogador::get_by_id)
                .put(jogador::update)
                .delete(jogador::delete),
        )
        .with_state(app)
}

pub async fn run(
    player_service: ArcPlayerService,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = router(AppState { player_service });

    let host = std::env::var("JOGADORES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("JOGADORES_HTTP_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("JOGADORES_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .expect("Failed to bind HTTP listener");

    info!("API server listening on {}:{}", host, port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .expect("HTTP server failed");

    info!("HTTP API shut down gracefully");
}

pub struct MyServiceError(ServiceError);

impl IntoResponse for MyServiceError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        let status = match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BadRequest(_)
            | ServiceError::Validation(_)
            | ServiceError::DuplicateCodename => StatusCode::BAD_REQUEST,
            ServiceError::InvalidArgument(_) | ServiceError::Internal(_) => {
                error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "errors": self.0.messages() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for MyServiceError {
    fn from(value: ServiceError) -> Self {
        MyServiceError(value)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    page_number: usize,
    page_size: usize,
    offset: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    content: Vec<T>,
    pageable: Pageable,
    total_elements: usize,
    total_pages: usize,
    number: usize,
    size: usize,
    number_of_elements: usize,
    first: bool,
    last: bool,
    empty: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let request = page.page_request;
        Self {
            pageable: Pageable {
                page_number: request.page(),
                page_size: request.size(),
                offset: request.offset(),
            },
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
            number: request.page(),
            size: request.size(),
            number_of_elements: page.number_of_elements(),
            first: page.is_first(),
            last: page.is_last(),
            empty: page.content.is_empty(),
            content: page.content,
        }
    }
}
