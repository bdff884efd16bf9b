// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{render_message, Notifier};
use crate::accept::AcceptedIdea;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// `None` when the SMTP env vars are absent or unparseable (a bad address
    /// is logged, not a panic — the other channels still run).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let user = std::env::var("SMTP_USER").ok()?;
        let pass = std::env::var("SMTP_PASS").ok()?;
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").ok()?;
        let to_addr = std::env::var("NOTIFY_EMAIL_TO").ok()?;

        let mailer = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(b) => b.credentials(Credentials::new(user, pass)).build(),
            Err(e) => {
                tracing::warn!(error = %e, "invalid SMTP_HOST, email channel disabled");
                return None;
            }
        };
        let from: Mailbox = match from_addr.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "invalid NOTIFY_EMAIL_FROM, email channel disabled");
                return None;
            }
        };
        let to: Mailbox = match to_addr.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "invalid NOTIFY_EMAIL_TO, email channel disabled");
                return None;
            }
        };

        Some(Self { mailer, from, to })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn deliver(&self, ideas: &[AcceptedIdea]) -> Result<()> {
        let subject = format!("Tradewire alert: {} idea(s)", ideas.len());
        let body = render_message(ideas);

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
