//! Clients for the identity service's synchronous verification endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::error::AuthorityError;
use crate::{VerifiedIdentity, VerifyResponse};

/// Default bound on the verification round trip. A stalled identity service
/// must fail the request, not stall every resource service behind it.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(3);

/// Default TTL for cached negative verification results.
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30);

/// Remote authority that can vouch for bearer tokens.
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthorityError>;
}

/// HTTP client for `GET {auth_url}/api/auth/verify`.
pub struct HttpAuthorityClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthorityClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthorityError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthorityError> {
        let url = format!("{}/api/auth/verify", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthorityError::Rejected);
        }
        if !status.is_success() {
            return Err(AuthorityError::Unavailable(format!(
                "verify endpoint returned {status}"
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;

        if !body.valid {
            return Err(AuthorityError::Rejected);
        }

        Ok(VerifiedIdentity {
            user_id: body.user_id,
            role: body.role,
        })
    }
}

/// Decorator that remembers recent rejections so repeated junk tokens do
/// not turn into repeated round trips to the authority.
///
/// Only negative answers are cached: a positive answer cached locally would
/// outlive revocation at the issuer. Tokens are keyed by digest, never
/// stored raw.
pub struct CachingAuthority<A> {
    inner: A,
    rejected: Cache<String, ()>,
}

impl<A> CachingAuthority<A> {
    pub fn new(inner: A, negative_ttl: Duration) -> Self {
        Self {
            inner,
            rejected: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(negative_ttl)
                .build(),
        }
    }
}

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[async_trait]
impl<A: AuthorityClient> AuthorityClient for CachingAuthority<A> {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthorityError> {
        let key = token_digest(token);
        if self.rejected.get(&key).await.is_some() {
            return Err(AuthorityError::Rejected);
        }

        match self.inner.verify(token).await {
            Err(AuthorityError::Rejected) => {
                self.rejected.insert(key, ()).await;
                Err(AuthorityError::Rejected)
            }
            other => other,
        }
    }
}

#[async_trait]
impl AuthorityClient for Arc<dyn AuthorityClient> {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthorityError> {
        self.as_ref().verify(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingAuthority {
        calls: AtomicUsize,
        answer: fn() -> Result<VerifiedIdentity, AuthorityError>,
    }

    impl CountingAuthority {
        fn new(answer: fn() -> Result<VerifiedIdentity, AuthorityError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthorityClient for &CountingAuthority {
        async fn verify(&self, _token: &str) -> Result<VerifiedIdentity, AuthorityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn accept() -> Result<VerifiedIdentity, AuthorityError> {
        Ok(VerifiedIdentity {
            user_id: Uuid::nil(),
            role: Role::User,
        })
    }

    fn reject() -> Result<VerifiedIdentity, AuthorityError> {
        Err(AuthorityError::Rejected)
    }

    #[tokio::test]
    async fn rejected_token_is_not_reverified_within_ttl() {
        let inner = CountingAuthority::new(reject);
        let authority = CachingAuthority::new(&inner, Duration::from_secs(30));

        for _ in 0..3 {
            let result = authority.verify("garbage-token").await;
            assert!(matches!(result, Err(AuthorityError::Rejected)));
        }
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn distinct_tokens_are_cached_independently() {
        let inner = CountingAuthority::new(reject);
        let authority = CachingAuthority::new(&inner, Duration::from_secs(30));

        let _ = authority.verify("token-a").await;
        let _ = authority.verify("token-b").await;
        let _ = authority.verify("token-a").await;
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn positive_results_are_never_cached() {
        let inner = CountingAuthority::new(accept);
        let authority = CachingAuthority::new(&inner, Duration::from_secs(30));

        assert!(authority.verify("good-token").await.is_ok());
        assert!(authority.verify("good-token").await.is_ok());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn unavailable_is_not_cached_as_rejection() {
        struct Flaky {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl AuthorityClient for &Flaky {
            async fn verify(&self, _token: &str) -> Result<VerifiedIdentity, AuthorityError> {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(AuthorityError::Unavailable("connection refused".into()))
                } else {
                    Ok(VerifiedIdentity {
                        user_id: Uuid::nil(),
                        role: Role::Admin,
                    })
                }
            }
        }

        let inner = Flaky {
            calls: AtomicUsize::new(0),
        };
        let authority = CachingAuthority::new(&inner, Duration::from_secs(30));

        assert!(matches!(
            authority.verify("token").await,
            Err(AuthorityError::Unavailable(_))
        ));
        // Recovery must be possible once the authority is back.
        assert!(authority.verify("token").await.is_ok());
    }
}
