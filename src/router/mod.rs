pub mod contact;
pub mod health;

use serde::Serialize;

/// `{ "ok": true }`, the body of every successful response.
#[derive(Debug, Serialize)]
pub struct Ack {
    ok: bool,
}

impl Ack {
    pub(crate) fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
pub(crate) fn state(
    transport: std::sync::Arc<dyn crate::mail::Transport>,
    auto_reply: bool,
) -> crate::AppState {
    use std::sync::{Arc, Mutex};

    let config = Arc::new(crate::config::Configuration::sample());
    let mail = crate::mail::MailManager::with_transport(
        transport,
        "Acme <relay@acme.example>".parse().unwrap(),
        "inbox@acme.example".parse().unwrap(),
        auto_reply,
    );

    crate::AppState {
        config,
        mail,
        limiter: Arc::new(Mutex::new(
            crate::ratelimiter::RateLimiter::default(),
        )),
    }
}
