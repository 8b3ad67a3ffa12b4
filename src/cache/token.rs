use chrono::{DateTime, TimeDelta, Utc};

/// Bearer token with its computed expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub acquired_at: DateTime<Utc>,
    /// acquired_at + (expires_in - safety margin)
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: String, acquired_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self { value, acquired_at, expires_at }
    }

    /// Build a token from the server-reported lifetime.
    /// A lifetime shorter than the margin yields an already expired token.
    /// `None` when the lifetime is negative or the expiry is not representable.
    pub fn from_lifetime(
        value: String,
        acquired_at: DateTime<Utc>,
        expires_in_seconds: i64,
        safety_margin_seconds: i64,
    ) -> Option<Self> {
        if expires_in_seconds < 0 {
            return None;
        }
        let expires_at = expires_in_seconds
            .checked_sub(safety_margin_seconds)
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| acquired_at.checked_add_signed(lifetime))?;
        Some(Self::new(value, acquired_at, expires_at))
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn acquired() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 25, 10, 0, 0).unwrap()
    }

    #[test]
    fn valid_until_lifetime_minus_margin() {
        let t = acquired();
        let token = Token::from_lifetime("abc".into(), t, 3600, 20).unwrap();

        assert!(token.is_valid_at(t));
        assert!(token.is_valid_at(t + TimeDelta::seconds(3579)));
        assert!(!token.is_valid_at(t + TimeDelta::seconds(3580)));
        assert!(!token.is_valid_at(t + TimeDelta::seconds(7200)));
    }

    #[test]
    fn lifetime_equal_to_margin_is_expired_immediately() {
        let t = acquired();
        let token = Token::from_lifetime("abc".into(), t, 20, 20).unwrap();
        assert!(!token.is_valid_at(t));
    }

    #[test]
    fn out_of_range_lifetimes_are_rejected() {
        let t = acquired();
        assert!(Token::from_lifetime("abc".into(), t, i64::MAX, 20).is_none());
        assert!(Token::from_lifetime("abc".into(), t, i64::MIN, 20).is_none());
        assert!(Token::from_lifetime("abc".into(), t, -1, 20).is_none());
        assert!(Token::from_lifetime("abc".into(), t, 5, i64::MIN).is_none());
    }

    #[test]
    fn bearer_header_value() {
        let token = Token::from_lifetime("xyz".into(), acquired(), 60, 20).unwrap();
        assert_eq!(token.bearer(), "Bearer xyz");
    }
}
