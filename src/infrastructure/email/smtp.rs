use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::MultiPart,
    transport::smtp::authentication::Credentials,
};

use crate::errors::ApiError;

/// SMTP mailer for booking-inquiry notifications.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    recipient: String,
}

impl Mailer {
    pub fn new(
        smtp_host: &str,
        username: &str,
        password: &str,
        recipient: &str,
    ) -> Result<Self, ApiError> {
        let creds = Credentials::new(username.to_string(), password.to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| ApiError::EmailFailed(e.to_string()))?
            .credentials(creds)
            .build();

        Ok(Mailer {
            transport,
            from: format!("\"Tronious Website\" <{username}>"),
            recipient: recipient.to_string(),
        })
    }

    /// Sends one notification with both a plain-text and an HTML body.
    /// `reply_to` is set to the inquirer so the band can answer directly.
    pub async fn send(
        &self,
        reply_to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), ApiError> {
        let mut builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| ApiError::EmailFailed("invalid sender address".to_string()))?,
            )
            .to(self
                .recipient
                .parse()
                .map_err(|_| ApiError::EmailFailed("invalid recipient address".to_string()))?)
            .subject(subject);

        if let Ok(reply_to) = reply_to.parse() {
            builder = builder.reply_to(reply_to);
        }

        let email = builder
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))
            .map_err(|e| ApiError::EmailFailed(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ApiError::EmailFailed(e.to_string()))?;

        Ok(())
    }
}
