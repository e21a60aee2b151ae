use async_trait::async_trait;

use crate::ports::Notifier;

/// Logs codes instead of delivering them; stands in for a real mail
/// transport in development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        log::info!("verification code for {}: {}", email, code);
        Ok(())
    }

    async fn send_password_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        log::info!("password reset code for {}: {}", email, code);
        Ok(())
    }
}
