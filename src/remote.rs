use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{AuthUser, Session};
use crate::store::{RemoteError, Row, RowStore, SelectQuery};

pub const ENV_API_URL: &str = "TASKFLOW_API_URL";
pub const ENV_API_KEY: &str = "TASKFLOW_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Deployment knobs for the hosted platform.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RemoteConfig {
    /// Reads `TASKFLOW_API_URL` / `TASKFLOW_API_KEY`; blank values count
    /// as unset.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(ENV_API_URL)
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        Some(Self { base_url, api_key })
    }
}

/// HTTP client for the hosted platform: auth endpoints plus the row API.
#[derive(Clone)]
pub struct RemoteStore {
    base_url: String,
    api_key: String,
    http: Client,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            http,
        })
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, RemoteError> {
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "full_name": display_name },
        });
        let resp = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await?;
        let text = expect_success(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            user: AuthUser,
        }

        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await?;
        let text = expect_success(resp).await?;
        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(Session {
            access_token: token.access_token,
            user: token.user,
        })
    }

    pub async fn current_user(&self, session: &Session) -> Result<AuthUser, RemoteError> {
        let resp = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let text = expect_success(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), RemoteError> {
        let payload = serde_json::json!({ "type": "signup", "email": email });
        let resp = self
            .http
            .post(self.auth_url("resend"))
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}

impl RowStore for RemoteStore {
    async fn select(
        &self,
        session: &Session,
        table: &str,
        query: SelectQuery,
    ) -> Result<Vec<Row>, RemoteError> {
        let resp = self
            .http
            .get(self.rest_url(table))
            .query(&query.to_query_pairs())
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let text = expect_success(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn insert(
        &self,
        session: &Session,
        table: &str,
        record: &Value,
    ) -> Result<Row, RemoteError> {
        let resp = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(std::slice::from_ref(record))
            .send()
            .await?;
        let text = expect_success(resp).await?;
        let rows: Vec<Row> = serde_json::from_str(&text)?;
        rows.into_iter().next().ok_or(RemoteError::MissingRow)
    }

    async fn update(
        &self,
        session: &Session,
        table: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), RemoteError> {
        let resp = self
            .http
            .patch(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}

async fn expect_success(resp: reqwest::Response) -> Result<String, RemoteError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base_url: &str) -> RemoteStore {
        RemoteStore::new(RemoteConfig {
            base_url: base_url.to_string(),
            api_key: "anon".to_string(),
        })
        .expect("client builds")
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let store = store("https://project.example.com/");
        assert_eq!(
            store.rest_url("tasks"),
            "https://project.example.com/rest/v1/tasks"
        );
        assert_eq!(
            store.auth_url("token"),
            "https://project.example.com/auth/v1/token"
        );
    }

    #[test]
    fn config_from_env_requires_both_values() {
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_API_KEY);
        assert!(RemoteConfig::from_env().is_none());

        std::env::set_var(ENV_API_URL, "https://project.example.com");
        std::env::set_var(ENV_API_KEY, "  ");
        assert!(RemoteConfig::from_env().is_none());

        std::env::set_var(ENV_API_KEY, "anon-key");
        let config = RemoteConfig::from_env().expect("both vars set");
        assert_eq!(config.base_url, "https://project.example.com");
        assert_eq!(config.api_key, "anon-key");

        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_API_KEY);
    }
}
