//! Bearer-session authentication.
//!
//! Tokens look like `vt_<prefix>_<secret>`. The store keeps the prefix and
//! a hex-encoded SHA-256 of the secret; authentication looks the prefix up
//! and compares digests in constant time. Profile enrichment (company,
//! role) is bounded: a slow lookup falls back to a bare officer identity
//! instead of stalling the request behind it.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::application::repos::{ProfileRecord, SessionsRepo};

const TOKEN_TAG: &str = "vt";
const MIN_SECRET_LEN: usize = 32;
const FALLBACK_ROLE: &str = "officer";

pub const DEFAULT_PROFILE_LOOKUP_CAP: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionAuthError {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("expired session token")]
    Expired,
}

/// The authenticated caller, as seen by every downstream service.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthedUser {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub company_name: String,
    pub role: String,
}

#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn SessionsRepo>,
    profile_lookup_cap: Duration,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionsRepo>, profile_lookup_cap: Duration) -> Self {
        Self {
            repo,
            profile_lookup_cap,
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthedUser, SessionAuthError> {
        let parsed = parse_token(token).ok_or(SessionAuthError::Invalid)?;
        let record = self
            .repo
            .find_session(&parsed.prefix)
            .await
            .map_err(|_| SessionAuthError::Invalid)?
            .ok_or(SessionAuthError::Invalid)?;

        if let Some(expires_at) = record.expires_at
            && expires_at <= OffsetDateTime::now_utc()
        {
            return Err(SessionAuthError::Expired);
        }

        let hashed_input = hash_secret(&parsed.secret);
        if record
            .secret_hash
            .as_bytes()
            .ct_eq(hashed_input.as_bytes())
            .unwrap_u8()
            == 0
        {
            return Err(SessionAuthError::Invalid);
        }

        Ok(self.enrich(record.user_id).await)
    }

    async fn enrich(&self, user_id: Uuid) -> AuthedUser {
        let profile = match timeout(self.profile_lookup_cap, self.repo.find_profile(user_id)).await
        {
            Ok(Ok(profile)) => profile,
            Ok(Err(error)) => {
                warn!(%user_id, error = %error, "profile lookup failed, using fallback identity");
                None
            }
            Err(_) => {
                warn!(%user_id, "profile lookup timed out, using fallback identity");
                None
            }
        };

        match profile {
            Some(ProfileRecord {
                user_id,
                company_id,
                company_name,
                role,
            }) => AuthedUser {
                user_id,
                company_id,
                company_name,
                role,
            },
            None => AuthedUser {
                user_id,
                company_id: None,
                company_name: String::new(),
                role: FALLBACK_ROLE.to_string(),
            },
        }
    }
}

pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// A freshly minted session token with its storable parts.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub prefix: String,
    pub secret_hash: String,
}

/// Mint a token plus the row contents to store for it. Used by operator
/// tooling and tests; the service itself only verifies.
pub fn mint_token() -> MintedToken {
    let prefix = Uuid::new_v4().simple().to_string()[..12].to_string();
    let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let token = format!("{TOKEN_TAG}_{prefix}_{secret}");
    let secret_hash = hash_secret(&secret);
    MintedToken {
        token,
        prefix,
        secret_hash,
    }
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.splitn(3, '_');
    let tag = parts.next()?;
    if tag != TOKEN_TAG {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::{RepoError, SessionRecord};

    #[derive(Default)]
    struct MemorySessions {
        sessions: Mutex<HashMap<String, SessionRecord>>,
        profiles: Mutex<HashMap<Uuid, ProfileRecord>>,
        slow_profiles: bool,
    }

    #[async_trait]
    impl SessionsRepo for MemorySessions {
        async fn find_session(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError> {
            Ok(self.sessions.lock().unwrap().get(prefix).cloned())
        }

        async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, RepoError> {
            if self.slow_profiles {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
        }
    }

    fn seeded(user_id: Uuid, expires_at: Option<OffsetDateTime>) -> (MemorySessions, String) {
        let minted = mint_token();
        let repo = MemorySessions::default();
        repo.sessions.lock().unwrap().insert(
            minted.prefix.clone(),
            SessionRecord {
                prefix: minted.prefix.clone(),
                secret_hash: minted.secret_hash.clone(),
                user_id,
                expires_at,
            },
        );
        (repo, minted.token)
    }

    #[test]
    fn token_parsing_rejects_malformed_input() {
        assert!(parse_token("").is_none());
        assert!(parse_token("vt_onlyprefix").is_none());
        assert!(parse_token("xx_prefix_0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("vt_prefix_tooshort").is_none());
        assert!(parse_token("vt_prefix_0123456789abcdef0123456789abcdef").is_some());
    }

    #[tokio::test]
    async fn authenticate_round_trip() {
        let user_id = Uuid::new_v4();
        let (repo, token) = seeded(user_id, None);
        repo.profiles.lock().unwrap().insert(
            user_id,
            ProfileRecord {
                user_id,
                company_id: Some(Uuid::new_v4()),
                company_name: "Acme Lending".to_string(),
                role: "company_admin".to_string(),
            },
        );

        let service = SessionService::new(Arc::new(repo), DEFAULT_PROFILE_LOOKUP_CAP);
        let user = service.authenticate(&token).await.expect("valid token");

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.company_name, "Acme Lending");
        assert_eq!(user.role, "company_admin");
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let (repo, token) = seeded(Uuid::new_v4(), None);
        let service = SessionService::new(Arc::new(repo), DEFAULT_PROFILE_LOOKUP_CAP);

        let prefix = token.split('_').nth(1).unwrap();
        let forged = format!("vt_{prefix}_{}", "f".repeat(MIN_SECRET_LEN));
        assert!(matches!(
            service.authenticate(&forged).await,
            Err(SessionAuthError::Invalid)
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let expired = OffsetDateTime::now_utc() - time::Duration::hours(1);
        let (repo, token) = seeded(Uuid::new_v4(), Some(expired));
        let service = SessionService::new(Arc::new(repo), DEFAULT_PROFILE_LOOKUP_CAP);

        assert!(matches!(
            service.authenticate(&token).await,
            Err(SessionAuthError::Expired)
        ));
    }

    #[tokio::test]
    async fn slow_profile_lookup_falls_back_to_bare_identity() {
        let user_id = Uuid::new_v4();
        let (mut repo, token) = seeded(user_id, None);
        repo.slow_profiles = true;

        let service = SessionService::new(Arc::new(repo), Duration::from_millis(10));
        let user = service.authenticate(&token).await.expect("auth still succeeds");

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, FALLBACK_ROLE);
        assert!(user.company_name.is_empty());
    }
}
