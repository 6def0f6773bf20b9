use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{info, warn};

use crate::config::MailSettings;
use crate::models::message::ContactMessage;

/// Notify the site owner about a new contact message.
/// Runs the SMTP exchange on a blocking thread; failures are only logged.
pub fn notify_new_message(mail: &MailSettings, fallback_to: &str, site_name: &str, msg: &ContactMessage) {
    let to = match mail.recipient.as_deref().filter(|r| !r.is_empty()) {
        Some(r) => r.to_string(),
        None if !fallback_to.is_empty() => fallback_to.to_string(),
        None => {
            warn!("[email] No recipient configured, skipping notification");
            return;
        }
    };
    let subject = match msg.sujet {
        Some(ref s) => format!("[{}] {}", site_name, s),
        None => format!("[{}] New message from {}", site_name, msg.nom),
    };
    let body = msg.to_text();
    let mail = mail.clone();

    rocket::tokio::task::spawn_blocking(move || {
        match send_smtp(&mail, &to, &subject, &body) {
            Ok(()) => info!("[email] Notification sent to {}", to),
            Err(e) => warn!("[email] Failed to send notification to {}: {}", to, e),
        }
    });
}

pub fn send_smtp(mail: &MailSettings, to: &str, subject: &str, body: &str) -> Result<(), String> {
    let email = build_message(&mail.sender, to, subject, body)?;

    let mut builder = SmtpTransport::starttls_relay(&mail.server)
        .map_err(|e| format!("SMTP relay error: {}", e))?
        .port(mail.port);
    if !mail.username.is_empty() {
        builder = builder.credentials(Credentials::new(
            mail.username.clone(),
            mail.password.clone(),
        ));
    }

    builder
        .build()
        .send(&email)
        .map_err(|e| format!("SMTP send error: {}", e))?;
    Ok(())
}

pub fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Result<Message, String> {
    Message::builder()
        .from(from.parse().map_err(|e| format!("Invalid from address: {}", e))?)
        .to(to.parse().map_err(|e| format!("Invalid to address: {}", e))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| format!("Failed to build email: {}", e))
}
