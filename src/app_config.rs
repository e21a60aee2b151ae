use anyhow::{anyhow, Context};
use base64::prelude::{Engine, BASE64_STANDARD};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CLASSIFIER_URL: &str = "http://localhost:5000";
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CLASSIFIER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionConfig {
    Cookie { crypto_key: Vec<u8> },
    // key generated at boot; sessions do not survive a restart
    Ephemeral,
    // every request acts as this user; development only
    Dummy { user_id: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub classifier: ClassifierConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        let host = env::var("HOST").unwrap_or_else(|_| "localhost".to_owned());
        let port = env::var("PORT")
            .map(|x| x.parse::<u16>())
            .unwrap_or(Ok(8080))
            .context("PORT")?;
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL")?;
        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let defaults = ClassifierConfig::default();
        let classifier = ClassifierConfig {
            base_url: env::var("ML_SERVICE_URL").unwrap_or(defaults.base_url),
            timeout: env::var("ML_SERVICE_TIMEOUT_SECS")
                .map(|x| x.parse::<u64>().map(Duration::from_secs))
                .unwrap_or(Ok(defaults.timeout))
                .context("ML_SERVICE_TIMEOUT_SECS")?,
        };

        let session = match env::var("SESSION_KIND")
            .unwrap_or_else(|_| "COOKIE".to_owned())
            .as_str()
        {
            "COOKIE" => match env::var("SESSION_CRYPTO_KEY") {
                Ok(encoded) => {
                    let crypto_key = BASE64_STANDARD
                        .decode(encoded)
                        .context("SESSION_CRYPTO_KEY")?;
                    if crypto_key.len() < 64 {
                        Err(anyhow!("SESSION_CRYPTO_KEY must decode to at least 64 bytes"))?;
                    }
                    SessionConfig::Cookie { crypto_key }
                }
                Err(_) => SessionConfig::Ephemeral,
            },
            "DUMMY" => {
                let user_id = env::var("SESSION_DUMMY_USER_ID").context("SESSION_DUMMY_USER_ID")?;
                SessionConfig::Dummy { user_id }
            }
            _ => Err(anyhow!("Invalid session kind"))?,
        };

        Ok(AppConfig {
            host,
            port,
            database_url,
            uploads_dir,
            classifier,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_session_kind_carries_the_fixed_user() {
        env::set_var("DATABASE_URL", "postgres://localhost/app");
        env::set_var("SESSION_KIND", "DUMMY");
        env::set_var("SESSION_DUMMY_USER_ID", "dev-user");

        let config = AppConfig::from_env().unwrap();
        assert!(matches!(
            config.session,
            SessionConfig::Dummy { ref user_id } if user_id == "dev-user"
        ));

        env::remove_var("SESSION_KIND");
        env::remove_var("SESSION_DUMMY_USER_ID");
    }
}
