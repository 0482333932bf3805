use lettre::{
    Address, Message, SmtpTransport, Transport, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

/// Outbound notifications. Delivery is best-effort: failures are logged and
/// never surface to the caller, and sending never blocks a request.
pub trait EmailService {
    fn send(&self, to: &str, subject: &str, body: &str);
}

pub struct SmtpEmailService;

impl EmailService for SmtpEmailService {
    fn send(&self, to: &str, subject: &str, body: &str) {
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        std::thread::spawn(move || {
            if let Err(e) = send_email(&to, &subject, &body) {
                log::warn!("Failed to send email to {}: {}", to, e);
            }
        });
    }
}

fn send_email(to: &str, subject: &str, body: &str) -> Result<(), String> {
    let host = std::env::var("MATRI_EMAIL_HOST").map_err(|_| "MATRI_EMAIL_HOST env var not set")?;
    let user = std::env::var("MATRI_EMAIL_USER").map_err(|_| "MATRI_EMAIL_USER env var not set")?;
    let password =
        std::env::var("MATRI_EMAIL_PASSWORD").map_err(|_| "MATRI_EMAIL_PASSWORD env var not set")?;
    let from = std::env::var("MATRI_EMAIL_FROM").map_err(|_| "MATRI_EMAIL_FROM env var not set")?;
    let email = Message::builder()
        .from(Mailbox::new(
            None,
            Address::try_from(from.to_string())
                .map_err(|e| format!("Invalid from address: {}", e))?,
        ))
        .to(Mailbox::new(
            None,
            Address::try_from(to.to_string()).map_err(|e| format!("Invalid to address: {}", e))?,
        ))
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| format!("Failed to build email: {}", e))?;

    let transport = SmtpTransport::relay(&host)
        .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        .credentials(Credentials::new(user, password))
        .build();
    transport
        .send(&email)
        .map_err(|e| format!("Failed to send email: {}", e))?;
    Ok(())
}

#[cfg(test)]
pub mod mock {
    use std::sync::{Arc, Mutex};

    use super::EmailService;

    #[derive(Clone, Default)]
    pub struct MockEmailService {
        sent: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    impl MockEmailService {
        pub fn sent_messages(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EmailService for MockEmailService {
        fn send(&self, to: &str, subject: &str, body: &str) {
            self.sent.lock().unwrap().push((
                to.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
        }
    }
}
