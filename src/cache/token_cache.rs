use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::token::Token;

/// Holds at most one token for a client session.
///
/// The lock is held across a refresh, so concurrent callers that find the
/// token missing or expired trigger a single authentication between them.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<Mutex<Option<Token>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(None)) }
    }

    pub async fn set(&self, token: Token) {
        *self.inner.lock().await = Some(token);
    }

    /// Get token if it exists and is not expired
    pub async fn get(&self) -> Option<Token> {
        self.inner
            .lock()
            .await
            .as_ref()
            .filter(|token| token.is_valid_at(Utc::now()))
            .cloned()
    }

    /// Token as held, expired or not
    pub async fn peek(&self) -> Option<Token> {
        self.inner.lock().await.clone()
    }

    /// Return the held token while it is valid, otherwise run `refresh` and
    /// store its result. A failed refresh leaves the held token untouched.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<Token, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Token, E>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            return Ok(token.clone());
        }

        debug!(held = guard.is_some(), "token missing or expired, refreshing");
        let token = refresh().await?;
        *guard = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fresh(value: &str) -> Token {
        Token::from_lifetime(value.into(), Utc::now(), 3600, 20).unwrap()
    }

    fn expired(value: &str) -> Token {
        Token::from_lifetime(value.into(), Utc::now(), 0, 20).unwrap()
    }

    #[tokio::test]
    async fn refreshes_once_when_empty_then_reuses() {
        let cache = TokenCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(fresh("t1"))
                })
                .await
                .unwrap();
            assert_eq!(token.value, "t1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once() {
        let cache = TokenCache::new();
        cache.set(expired("old")).await;
        assert!(cache.get().await.is_none());

        let calls = AtomicUsize::new(0);
        let token = cache
            .get_or_refresh(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(fresh("new"))
            })
            .await
            .unwrap();

        assert_eq!(token.value, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get().await.map(|t| t.value), Some("new".to_owned()));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_token() {
        let cache = TokenCache::new();
        cache.set(expired("old")).await;

        let result = cache.get_or_refresh(|| async { Err::<Token, _>("denied") }).await;

        assert_eq!(result.unwrap_err(), "denied");
        assert_eq!(cache.peek().await.map(|t| t.value), Some("old".to_owned()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_refresh() {
        let cache = TokenCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok::<_, ()>(fresh("shared"))
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().value, "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
