//! HTTP client for the hosted auth REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use wastetrack_core::config::IdentityConfig;
use wastetrack_core::error::{AppError, ErrorKind};
use wastetrack_core::result::AppResult;
use wastetrack_entity::identity::{AuthSession, Identity};

use super::error::{AuthErrorBody, AuthFailure};
use super::provider::IdentityProvider;

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Talks to `{url}/auth/v1/*`.
#[derive(Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl std::fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoTrueClient {
    /// Build a client from configuration.
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn token_endpoint(&self, grant: &str) -> String {
        self.endpoint(&format!("token?grant_type={grant}"))
    }

    async fn token_grant<B: Serialize + Sync>(&self, grant: &str, body: &B) -> AppResult<AuthSession> {
        let response = self
            .http
            .post(self.token_endpoint(grant))
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(failure_from(response).await.into());
        }

        response.json::<AuthSession>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed session returned by the identity service",
                e,
            )
        })
    }
}

fn network_error(err: reqwest::Error) -> AppError {
    AuthFailure::Network(err.to_string()).into()
}

async fn failure_from(response: Response) -> AuthFailure {
    let status = response.status().as_u16();
    let body = response.json::<AuthErrorBody>().await.unwrap_or_default();
    AuthFailure::classify(status, &body)
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let session = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        info!(user_id = %session.identity.id, "Signed in with password");
        Ok(session)
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let session = self
            .token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await?;
        debug!(user_id = %session.identity.id, "Refreshed access token");
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!("Session already revoked on the identity service");
                Ok(())
            }
            _ => Err(failure_from(response).await.into()),
        }
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            s if s.is_success() => response.json::<Identity>().await.map(Some).map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Malformed identity returned by the identity service",
                    e,
                )
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Identity service rejected the stored access token");
                Ok(None)
            }
            _ => Err(failure_from(response).await.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GoTrueClient::new(&IdentityConfig {
            url: "https://abc.supabase.co/".into(),
            anon_key: "anon".into(),
            request_timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(client.endpoint("user"), "https://abc.supabase.co/auth/v1/user");
    }

    #[test]
    fn test_token_endpoint_carries_grant_type() {
        let client = GoTrueClient::new(&IdentityConfig {
            url: "https://abc.supabase.co".into(),
            anon_key: "anon".into(),
            request_timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(
            client.token_endpoint("refresh_token"),
            "https://abc.supabase.co/auth/v1/token?grant_type=refresh_token"
        );
    }
}
