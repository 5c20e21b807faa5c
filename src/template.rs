//! Mail body rendering.
//!
//! Pure functions from a sanitized [`Inquiry`] to plain-text and HTML
//! bodies. Plain text comes first for deliverability; the HTML stays
//! light: white background, system fonts, no images.

use chrono::{Datelike, Utc};

use crate::config::Configuration;
use crate::inquiry::Inquiry;

pub const NOTIFY_SUBJECT: &str = "New website inquiry";
const REPLY_NOTE: &str =
    "You can reply directly to this email to contact the sender.";

/// A fully rendered message, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Escape user-supplied content before embedding it in HTML.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn sender_line(inquiry: &Inquiry) -> String {
    match &inquiry.name {
        Some(name) => format!("{name} <{}>", inquiry.sender_email),
        None => inquiry.sender_email.clone(),
    }
}

/// Message sent to the configured inbox, with `Reply-To` pointing back at
/// the inquirer.
pub fn owner_notification(
    inquiry: &Inquiry,
    config: &Configuration,
) -> Rendered {
    let year = Utc::now().year();
    let from = sender_line(inquiry);

    let text = format!(
        "{NOTIFY_SUBJECT}\n\nFrom: {from}\nMessage:\n{message}\n\n—\n{REPLY_NOTE}\n© {year} {name} • {url}",
        message = inquiry.message,
        name = config.name,
        url = config.url,
    );

    let html = format!(
        r#"<!doctype html>
<html>
  <body style="margin:0;padding:24px;background:#ffffff;color:#0f1726;font:14px/1.6 -apple-system,Segoe UI,Roboto,Arial,sans-serif">
    <div style="max-width:640px;margin:0 auto">
      <h1 style="margin:0 0 12px;font-size:20px;letter-spacing:.2px">{NOTIFY_SUBJECT}</h1>
      <table role="presentation" cellspacing="0" cellpadding="0" style="width:100%;border-collapse:collapse">
        <tr>
          <td style="padding:8px 0;width:96px;color:#475569">From</td>
          <td style="padding:8px 0"><a href="mailto:{email}" style="color:#0ea5e9;text-decoration:none">{from}</a></td>
        </tr>
        <tr>
          <td style="padding:8px 0;color:#475569">Message</td>
          <td style="padding:8px 0">
            <div style="padding:12px;border:1px solid #e5e7eb;border-radius:8px;white-space:pre-wrap">{message}</div>
          </td>
        </tr>
      </table>

      <p style="margin:20px 0 0;color:#334155">{REPLY_NOTE}</p>
      <p style="margin:16px 0 0;color:#64748b;font-size:12px">
        © {year} {name} •
        <a href="{url}" style="color:#0ea5e9;text-decoration:none">{url}</a>
      </p>
    </div>
  </body>
</html>"#,
        email = escape_html(&inquiry.sender_email),
        from = escape_html(&from),
        message = escape_html(&inquiry.message),
        name = escape_html(&config.name),
        url = config.url,
    );

    Rendered {
        subject: NOTIFY_SUBJECT.to_owned(),
        text,
        html,
    }
}

/// Confirmation sent back to the inquirer when auto-reply is enabled.
pub fn auto_reply(inquiry: &Inquiry, config: &Configuration) -> Rendered {
    let year = Utc::now().year();
    // keep the subject ASCII so it survives as-is on the wire.
    let subject = format!("We received your message - {}", config.name);
    let greeting = match &inquiry.name {
        Some(name) => format!("Hi {name},"),
        None => "Hi,".to_owned(),
    };

    let text = format!(
        "{greeting}\n\nThanks for reaching out to {name}. We received your message and will get back to you shortly.\n\nYour message:\n{message}\n\n—\n© {year} {name} • {url}",
        message = inquiry.message,
        name = config.name,
        url = config.url,
    );

    let html = format!(
        r#"<!doctype html>
<html>
  <body style="margin:0;padding:24px;background:#ffffff;color:#0f1726;font:14px/1.6 -apple-system,Segoe UI,Roboto,Arial,sans-serif">
    <div style="max-width:640px;margin:0 auto">
      <p style="margin:0 0 12px">{greeting}</p>
      <p style="margin:0 0 12px">Thanks for reaching out to {name}. We received your message and will get back to you shortly.</p>
      <div style="padding:12px;border:1px solid #e5e7eb;border-radius:8px;white-space:pre-wrap">{message}</div>
      <p style="margin:16px 0 0;color:#64748b;font-size:12px">
        © {year} {name} •
        <a href="{url}" style="color:#0ea5e9;text-decoration:none">{url}</a>
      </p>
    </div>
  </body>
</html>"#,
        greeting = escape_html(&greeting),
        message = escape_html(&inquiry.message),
        name = escape_html(&config.name),
        url = config.url,
    );

    Rendered {
        subject,
        text,
        html,
    }
}
