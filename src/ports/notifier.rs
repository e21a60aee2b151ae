use async_trait::async_trait;

/// Delivery of one-time codes to users. Transport selection lives behind this
/// contract; callers only ever send best-effort.
#[async_trait]
pub trait Notifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()>;

    async fn send_password_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}
