use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const CODE_TTL_MINUTES: i64 = 10;

/// Five-digit code mailed to a user, valid for ten minutes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OneTimeCode {
    code: String,
    expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let code = rand::thread_rng().gen_range(10_000..100_000).to_string();
        Self {
            code,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
        }
    }

    // for repository
    pub fn from_parts(code: String, expires_at: DateTime<Utc>) -> Self {
        Self { code, expires_at }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn matches(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        self.code == candidate && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_digits() {
        let code = OneTimeCode::generate(Utc::now());
        assert_eq!(code.code().len(), 5);
        assert!(code.code().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn expires_after_ttl() {
        let now = Utc::now();
        let code = OneTimeCode::generate(now);
        let candidate = code.code().to_string();
        assert!(code.matches(&candidate, now + Duration::minutes(9)));
        assert!(!code.matches(&candidate, now + Duration::minutes(10)));
    }

    #[test]
    fn wrong_code_never_matches() {
        let now = Utc::now();
        let code = OneTimeCode::from_parts("12345".to_string(), now + Duration::minutes(10));
        assert!(!code.matches("54321", now));
    }
}
