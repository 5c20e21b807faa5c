use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::AppState;
use crate::error::Result;
use crate::inquiry::{ContactBody, Screening};
use crate::router::Ack;

/// Handler to screen and relay a contact-form submission.
pub async fn handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;

    match body.screen()? {
        // bots get the same answer as everyone else.
        Screening::Spam => {
            tracing::debug!("honeypot field filled, submission suppressed");
            Ok(Json(Ack::ok()))
        },
        Screening::Inquiry(inquiry) => {
            state.mail.relay(&inquiry, &state.config).await?;
            Ok(Json(Ack::ok()))
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::mail::mock::MockTransport;
    use crate::{app, make_request, router};

    fn valid_body() -> String {
        json!({ "email": "a@b.com", "message": "Hello" }).to_string()
    }

    #[tokio::test]
    async fn test_valid_inquiry_is_relayed() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let response =
            make_request(app, Method::POST, "/api/contact", valid_body(), &[])
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["ok"], true);

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Reply-To: a@b.com"));
        assert!(sent[0].contains("To: inbox@acme.example"));
    }

    #[tokio::test]
    async fn test_honeypot_suppresses_mail_but_acknowledges() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let body = json!({
            "email": "a@b.com",
            "message": "Hello",
            "website": "https://spam.example",
        })
        .to_string();
        let response =
            make_request(app, Method::POST, "/api/contact", body, &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let body = json!({ "email": "not-an-email", "message": "Hello" })
            .to_string();
        let response =
            make_request(app, Method::POST, "/api/contact", body, &[]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Invalid email.");
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let body =
            json!({ "email": "a@b.com", "message": "   " }).to_string();
        let response =
            make_request(app, Method::POST, "/api/contact", body, &[]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Message required.");
    }

    #[tokio::test]
    async fn test_markup_in_message_is_escaped_in_rich_body() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let body = json!({
            "email": "a@b.com",
            "message": "<script>alert(1)</script>",
        })
        .to_string();
        let response =
            make_request(app, Method::POST, "/api/contact", body, &[]).await;
        assert_eq!(response.status(), StatusCode::OK);

        // undo quoted-printable soft line breaks before matching.
        let flat = mock.sent()[0].replace("=\r\n", "");
        assert!(flat.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[tokio::test]
    async fn test_delivery_failure_returns_generic_500() {
        let mock = Arc::new(MockTransport::new());
        mock.fail_from(0);
        let app = app(router::state(mock, false));

        let response =
            make_request(app, Method::POST, "/api/contact", valid_body(), &[])
                .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Mail send failed.");
    }

    #[tokio::test]
    async fn test_disallowed_origin_is_rejected_before_handler() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock.clone(), false));

        let response = make_request(
            app,
            Method::POST,
            "/api/contact",
            valid_body(),
            &[("origin", "https://evil.example")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn test_allowed_origin_passes() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock, false));

        let response = make_request(
            app,
            Method::POST,
            "/api/contact",
            valid_body(),
            &[("origin", "https://acme.example")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sixth_rapid_request_is_rate_limited() {
        let mock = Arc::new(MockTransport::new());
        let state = router::state(mock, false);

        for _ in 0..5 {
            let response = make_request(
                app(state.clone()),
                Method::POST,
                "/api/contact",
                valid_body(),
                &[("x-forwarded-for", "203.0.113.9")],
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = make_request(
            app(state),
            Method::POST,
            "/api/contact",
            valid_body(),
            &[("x-forwarded-for", "203.0.113.9")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let mock = Arc::new(MockTransport::new());
        let state = router::state(mock, false);

        for _ in 0..5 {
            make_request(
                app(state.clone()),
                Method::POST,
                "/api/contact",
                valid_body(),
                &[("x-forwarded-for", "203.0.113.9")],
            )
            .await;
        }

        let response = make_request(
            app(state),
            Method::POST,
            "/api/contact",
            valid_body(),
            &[("x-forwarded-for", "198.51.100.7")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_a_400() {
        let mock = Arc::new(MockTransport::new());
        let app = app(router::state(mock, false));

        let response = make_request(
            app,
            Method::POST,
            "/api/contact",
            "{not json".to_owned(),
            &[],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
