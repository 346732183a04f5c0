use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Outbound mail seam. Delivery is an external collaborator; the crate only
/// defines the contract and a logging implementation, and deployments wire
/// a real transport behind it.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand off a freshly provisioned author credential.
    async fn send_credentials(
        &self,
        to: &str,
        username: &str,
        temp_password: &str,
    ) -> Result<(), MailerError>;
}

/// Records the hand-off in the log instead of sending mail. The credential
/// itself is never logged.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_credentials(
        &self,
        to: &str,
        username: &str,
        _temp_password: &str,
    ) -> Result<(), MailerError> {
        info!("Credential hand-off for author '{}' queued to {}", username, to);
        Ok(())
    }
}
