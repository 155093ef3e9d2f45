//! Auth token model
//!
//! Opaque access/refresh tokens persisted in the database. Logout blacklists
//! the refresh token by setting its `revoked` bit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token attached to requests
    Access,
    /// Long-lived token used to mint new access tokens
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

impl FromStr for TokenKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            _ => Err(anyhow::anyhow!("Invalid token kind: {}", s)),
        }
    }
}

/// Persisted auth token
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// Opaque token value (primary key)
    pub token: String,
    /// Owning user id
    pub user_id: i64,
    /// Access or refresh
    pub kind: TokenKind,
    /// Expiration instant
    pub expires_at: DateTime<Utc>,
    /// Blacklist bit
    pub revoked: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token is usable while unrevoked and unexpired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Access/refresh pair returned by login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in: Duration) -> AuthToken {
        let now = Utc::now();
        AuthToken {
            token: "t".to_string(),
            user_id: 1,
            kind: TokenKind::Refresh,
            expires_at: now + expires_in,
            revoked,
            created_at: now,
        }
    }

    #[test]
    fn test_token_validity() {
        let now = Utc::now();
        assert!(token(false, Duration::minutes(5)).is_valid(now));
        assert!(!token(true, Duration::minutes(5)).is_valid(now));
        assert!(!token(false, Duration::minutes(-5)).is_valid(now));
    }

    #[test]
    fn test_token_kind_round_trip() {
        assert_eq!(TokenKind::from_str("access").unwrap(), TokenKind::Access);
        assert_eq!(TokenKind::from_str("refresh").unwrap(), TokenKind::Refresh);
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert!(TokenKind::from_str("session").is_err());
    }
}
