//! Transport connectivity probe.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::router::Ack;

/// Verify the SMTP connection and report `{ ok: true }` when it holds.
pub async fn handler(State(state): State<AppState>) -> Result<Json<Ack>> {
    state.mail.verify().await?;
    Ok(Json(Ack::ok()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::mail::mock::MockTransport;
    use crate::{app, make_request, router};

    #[tokio::test]
    async fn test_healthy_transport_reports_ok() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock, false));

        let response =
            make_request(app, Method::GET, "/api/health", String::new(), &[])
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_broken_transport_reports_error() {
        let mock = Arc::new(MockTransport::new());
        mock.set_unhealthy();
        let app = app(router::state(mock, false));

        let response =
            make_request(app, Method::GET, "/api/health", String::new(), &[])
                .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Mail transport unavailable.");
    }
}
