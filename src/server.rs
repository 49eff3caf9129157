use std::future::Future;

use anyhow::{Context, Error};
use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::HttpConfig;
use crate::lights::{LightCommand, LightHandle};

const SET_LIGHT_PATTERN: &str = "/SetLightPattern";
const CLEAR_LIGHTS: &str = "/ClearLights";

/// Clients expect this header even though the body is plain text
const CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
struct AppState {
    lights: LightHandle,
}

/// A command found in a request path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// The second path segment when it is all digits, leading zeros dropped.
    /// Kept as text so values too large for a pattern id are echoed intact.
    SetPattern { index: Option<String> },
    Clear,
}

impl Route {
    pub fn command(&self) -> LightCommand {
        match self {
            Route::SetPattern { index } => {
                LightCommand::from_pattern_id(index.as_deref().and_then(|i| i.parse().ok()))
            }
            Route::Clear => LightCommand::Clear,
        }
    }

    /// Body sent back once the command has been shown
    pub fn confirmation(&self) -> String {
        match self {
            Route::SetPattern { index } => {
                format!("Light pattern {} set", index.as_deref().unwrap_or("None"))
            }
            Route::Clear => "Lights cleared".to_string(),
        }
    }
}

/// Every command in `path`, in the order they run. Empty when the path does
/// not name one.
pub fn parse_routes(path: &str) -> Vec<Route> {
    let segments: Vec<&str> = path.split('/').collect();
    let mut routes = Vec::new();

    if path.contains(SET_LIGHT_PATTERN) {
        if let Some(segment) = segments.get(2) {
            let index = (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
                .then(|| normalize_index(segment));
            routes.push(Route::SetPattern { index });
        }
    }

    if path.contains(CLEAR_LIGHTS) {
        routes.push(Route::Clear);
    }

    routes
}

/// Digits as an integer would print them: no leading zeros, but `0` stays
fn normalize_index(digits: &str) -> String {
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn router(lights: LightHandle) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { lights })
}

async fn handle_request(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return StatusCode::NOT_IMPLEMENTED.into_response();
    }

    let routes = parse_routes(uri.path());
    if routes.is_empty() {
        debug!("Ignoring request for {}", uri.path());
        return StatusCode::NOT_FOUND.into_response();
    }

    // A failed command is only logged: the caller still gets a 200, minus the
    // confirmation of the command that failed and anything after it
    let mut body = String::new();
    for route in routes {
        let command = route.command();
        if let Err(e) = state.lights.send(command).await {
            error!("Error processing http request {}: {:?}", uri.path(), e);
            break;
        }
        info!("{:?} done for {}", command, uri.path());
        body.push_str(&route.confirmation());
    }

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(config: &HttpConfig, lights: LightHandle, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = (config.address.as_str(), config.port);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {}:{}", config.address, config.port))?;

    info!("Pights listening on http://{}:{}", config.address, config.port);

    axum::serve(listener, router(lights))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")
}
