use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::auth::otp::OTP_EXPIRY_MINUTES;
use crate::config::SmtpConfig;

/// Outbound email is an external collaborator; handlers only see this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("smtp relay")?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config.from.parse().context("parse EMAIL_FROM")?;
        Ok(Self { transport, from })
    }
}

fn otp_bodies(code: &str) -> (String, String) {
    let plain = format!(
        "Your CodeHire AI verification code is: {}. It expires in {} minutes.",
        code, OTP_EXPIRY_MINUTES
    );
    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 400px;">
  <h2 style="color: #0f172a;">Verification code</h2>
  <p>Your verification code is:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px; color: #0369a1;">{}</p>
  <p style="color: #64748b; font-size: 14px;">This code expires in {} minutes.</p>
  <p style="color: #64748b; font-size: 14px;">If you didn't request this, you can ignore this email.</p>
</div>"#,
        code, OTP_EXPIRY_MINUTES
    );
    (plain, html)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let (plain, html) = otp_bodies(code);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("parse recipient")?)
            .subject("Your CodeHire AI verification code")
            .multipart(MultiPart::alternative_plain_html(plain, html))
            .context("build email")?;
        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

/// Stand-in when SMTP settings are absent; every send fails with a
/// configuration message the send-otp handler surfaces as a 500.
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send_otp(&self, _to: &str, _code: &str) -> anyhow::Result<()> {
        anyhow::bail!("Email is not configured. Set SMTP_HOST, SMTP_USER, SMTP_PASS")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_bodies_mention_code_and_expiry() {
        let (plain, html) = otp_bodies("042137");
        assert!(plain.contains("042137"));
        assert!(plain.contains("5 minutes"));
        assert!(html.contains("042137"));
    }
}
