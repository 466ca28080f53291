// ABOUTME: In-memory OAuth 2.1 store backed by sharded concurrent maps
// ABOUTME: Implements the client, code, and token repositories with per-record atomicity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::repository::{
    AuthCodeRepository, ClientRepository, CodeCheck, CodeRejection, TokenRepository,
};
use crate::errors::AppResult;
use crate::models::{AccessToken, AuthorizationCode, OAuth2Client, RefreshToken};

/// In-memory implementation of every OAuth 2.1 repository
///
/// Each map is a `DashMap`, so a mutation holds only the shard lock of the
/// record it touches. Code redemption runs its whole check-and-flip sequence
/// under that lock, which makes it linearizable per code.
#[derive(Default)]
pub struct InMemoryOAuthStore {
    clients: DashMap<String, OAuth2Client>,
    auth_codes: DashMap<String, AuthorizationCode>,
    access_tokens: DashMap<String, AccessToken>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl InMemoryOAuthStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored authorization codes, used or not
    #[must_use]
    pub fn auth_code_count(&self) -> usize {
        self.auth_codes.len()
    }
}

#[async_trait]
impl ClientRepository for InMemoryOAuthStore {
    async fn store_client(&self, client: OAuth2Client) -> AppResult<()> {
        self.clients.insert(client.client_id.clone(), client); // Safe: map key ownership
        Ok(())
    }

    async fn get_client(&self, client_id: &str) -> AppResult<Option<OAuth2Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn set_client_active(&self, client_id: &str, is_active: bool) -> AppResult<bool> {
        Ok(self
            .clients
            .get_mut(client_id)
            .map(|mut entry| entry.is_active = is_active)
            .is_some())
    }
}

#[async_trait]
impl AuthCodeRepository for InMemoryOAuthStore {
    async fn store_auth_code(&self, code: AuthorizationCode) -> AppResult<()> {
        self.auth_codes.insert(code.code.clone(), code); // Safe: map key ownership
        Ok(())
    }

    async fn consume_auth_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
        check: CodeCheck<'_>,
    ) -> AppResult<Result<AuthorizationCode, CodeRejection>> {
        // The RefMut keeps the shard write-locked until the flag is flipped
        let Some(mut entry) = self.auth_codes.get_mut(code) else {
            return Ok(Err(CodeRejection::NotFound));
        };

        if entry.used {
            return Ok(Err(CodeRejection::AlreadyUsed));
        }
        if entry.is_expired(now) {
            return Ok(Err(CodeRejection::Expired));
        }
        if let Err(rejection) = check(entry.value()) {
            return Ok(Err(rejection));
        }

        entry.used = true;
        Ok(Ok(entry.value().clone()))
    }

    async fn purge_auth_codes(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let before = self.auth_codes.len();
        self.auth_codes
            .retain(|_, code| !code.used && !code.is_expired(now));
        Ok(before.saturating_sub(self.auth_codes.len()))
    }
}

#[async_trait]
impl TokenRepository for InMemoryOAuthStore {
    async fn store_access_token(&self, token: AccessToken) -> AppResult<()> {
        self.access_tokens.insert(token.token.clone(), token); // Safe: map key ownership
        Ok(())
    }

    async fn get_access_token(&self, token: &str) -> AppResult<Option<AccessToken>> {
        Ok(self
            .access_tokens
            .get(token)
            .map(|entry| entry.value().clone()))
    }

    async fn delete_access_token(&self, token: &str) -> AppResult<bool> {
        Ok(self.access_tokens.remove(token).is_some())
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> AppResult<()> {
        self.refresh_tokens.insert(token.token.clone(), token); // Safe: map key ownership
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self
            .refresh_tokens
            .get(token)
            .map(|entry| entry.value().clone()))
    }

    async fn repoint_refresh_token(
        &self,
        token: &str,
        access_token_id: &str,
    ) -> AppResult<Option<String>> {
        Ok(self.refresh_tokens.get_mut(token).map(|mut entry| {
            std::mem::replace(&mut entry.access_token_id, access_token_id.to_owned())
        }))
    }

    async fn delete_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.refresh_tokens.remove(token).map(|(_, record)| record))
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let before = self.access_tokens.len() + self.refresh_tokens.len();
        self.access_tokens.retain(|_, token| !token.is_expired(now));
        self.refresh_tokens.retain(|_, token| !token.is_expired(now));
        let after = self.access_tokens.len() + self.refresh_tokens.len();
        Ok(before.saturating_sub(after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CodeChallengeMethod;
    use chrono::Duration;

    fn sample_code(value: &str, expires_at: DateTime<Utc>) -> AuthorizationCode {
        AuthorizationCode {
            code: value.to_owned(),
            client_id: "mcp_test".to_owned(),
            user_id: "mcp_user".to_owned(),
            redirect_uri: "https://app.example/cb".to_owned(),
            scope: "read write".to_owned(),
            code_challenge: "challenge".to_owned(),
            code_challenge_method: CodeChallengeMethod::Plain,
            resource: None,
            expires_at,
            used: false,
        }
    }

    #[tokio::test]
    async fn test_consume_flips_used_once() {
        let store = InMemoryOAuthStore::new();
        let now = Utc::now();
        store
            .store_auth_code(sample_code("abc", now + Duration::minutes(10)))
            .await
            .unwrap();

        let accept = |_: &AuthorizationCode| Ok::<(), CodeRejection>(());
        let first = store.consume_auth_code("abc", now, &accept).await.unwrap();
        assert!(first.is_ok());

        let second = store.consume_auth_code("abc", now, &accept).await.unwrap();
        assert_eq!(second.unwrap_err(), CodeRejection::AlreadyUsed);
    }

    #[tokio::test]
    async fn test_failed_check_leaves_code_redeemable() {
        let store = InMemoryOAuthStore::new();
        let now = Utc::now();
        store
            .store_auth_code(sample_code("abc", now + Duration::minutes(10)))
            .await
            .unwrap();

        let reject = |_: &AuthorizationCode| Err::<(), CodeRejection>(CodeRejection::PkceMismatch);
        let outcome = store.consume_auth_code("abc", now, &reject).await.unwrap();
        assert_eq!(outcome.unwrap_err(), CodeRejection::PkceMismatch);

        let accept = |_: &AuthorizationCode| Ok::<(), CodeRejection>(());
        assert!(store
            .consume_auth_code("abc", now, &accept)
            .await
            .unwrap()
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_rejected_and_purged() {
        let store = InMemoryOAuthStore::new();
        let now = Utc::now();
        store
            .store_auth_code(sample_code("old", now - Duration::seconds(1)))
            .await
            .unwrap();

        let accept = |_: &AuthorizationCode| Ok::<(), CodeRejection>(());
        let outcome = store.consume_auth_code("old", now, &accept).await.unwrap();
        assert_eq!(outcome.unwrap_err(), CodeRejection::Expired);

        assert_eq!(store.purge_auth_codes(now).await.unwrap(), 1);
        assert_eq!(store.auth_code_count(), 0);
    }

    #[tokio::test]
    async fn test_repoint_returns_previous_target() {
        let store = InMemoryOAuthStore::new();
        let now = Utc::now();
        store
            .store_refresh_token(RefreshToken {
                token: "rt".to_owned(),
                access_token_id: "at-1".to_owned(),
                client_id: "mcp_test".to_owned(),
                user_id: "mcp_user".to_owned(),
                scope: "read".to_owned(),
                resource: None,
                expires_at: now + Duration::days(1),
                created_at: now,
            })
            .await
            .unwrap();

        let previous = store.repoint_refresh_token("rt", "at-2").await.unwrap();
        assert_eq!(previous.as_deref(), Some("at-1"));
        let stored = store.get_refresh_token("rt").await.unwrap().unwrap();
        assert_eq!(stored.access_token_id, "at-2");
        assert!(store
            .repoint_refresh_token("missing", "at-3")
            .await
            .unwrap()
            .is_none());
    }
}
