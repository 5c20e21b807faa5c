//! Contact-relay is a small contact-form backend relaying inquiries over SMTP.

#[forbid(unsafe_code)]
pub mod config;
pub mod error;
mod inquiry;
mod mail;
mod middleware;
mod ratelimiter;
mod router;
mod template;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use ratelimiter::RateLimiter;

/// Matches the front-end form payload with room to spare.
const BODY_LIMIT: usize = 100_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
    headers: &[(&str, &str)],
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    app.oneshot(builder.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub mail: mail::MailManager,
    pub limiter: Arc<Mutex<RateLimiter>>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let allowed_origins = state.config.allowed_origins.clone();
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(TraceLayer::new_for_http())
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    origin
                        .to_str()
                        .map(|origin| {
                            allowed_origins
                                .iter()
                                .any(|allowed| allowed == origin)
                        })
                        .unwrap_or(false)
                }))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .max_age(CORS_MAX_AGE),
        );

    let api = Router::new()
        // `POST /api/contact` goes through the rate limiter first.
        .route("/contact", post(router::contact::handler))
        .route_layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        // `GET /api/health` verifies the SMTP connection.
        .route("/health", get(router::health::handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state.clone())
        .route_layer(AxumMiddleware::from_fn_with_state(
            state,
            middleware::check_origin,
        ))
        .layer(middleware)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found.")
}

/// Initialize the application state.
pub fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>> {
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read()?;

    // handle mail relay. credentials are required to send anything.
    let Some(mail_config) = &config.mail else {
        tracing::error!("missing `mail` entry on `config.yaml` file");
        std::process::exit(0);
    };
    let user = std::env::var("MAIL_USER")
        .expect("missing `MAIL_USER` environnement variable");
    let pass = std::env::var("MAIL_PASS")
        .expect("missing `MAIL_PASS` environnement variable");

    let mail = mail::MailManager::new(mail_config, &config.name, &user, &pass)?;

    Ok(AppState {
        config,
        mail,
        limiter: Arc::new(Mutex::new(RateLimiter::default())),
    })
}
