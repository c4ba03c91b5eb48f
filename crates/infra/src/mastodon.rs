use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use hubs_domain::ports::BoxFuture;
use hubs_domain::ports::identity::{IdentityError, IdentityPort, VerifiedIdentity};

use crate::config::AppConfig;

const VERIFY_CREDENTIALS_PATH: &str = "api/v1/accounts/verify_credentials";
const VERIFY_TIMEOUT_MS: u64 = 10_000;

/// Verifies end-user bearer tokens against the Mastodon-compatible
/// identity provider.
pub struct MastodonClient {
    http: reqwest::Client,
    base_url: String,
    account_domain: String,
}

impl MastodonClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(VERIFY_TIMEOUT_MS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.mastodon_base_url.trim_end_matches('/').to_string(),
            account_domain: account_domain(&config.mastodon_base_url),
        }
    }

    async fn fetch_identity(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let url = format!("{}/{VERIFY_CREDENTIALS_PATH}", self.base_url);
        let response = self
            .http
            .get(url.as_str())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|err| IdentityError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => IdentityError::Unauthorized(message),
                StatusCode::FORBIDDEN => IdentityError::Forbidden(message),
                status => IdentityError::Upstream(format!(
                    "status {}: {}",
                    status.as_u16(),
                    message
                )),
            });
        }

        let body: CredentialAccount = response
            .json()
            .await
            .map_err(|err| IdentityError::InvalidResponse(err.to_string()))?;

        // Local accounts come back as a bare username; qualify them with
        // the provider's own domain.
        let acct = if body.acct.contains('@') {
            body.acct
        } else {
            format!("{}{}", body.acct, self.account_domain)
        };

        Ok(VerifiedIdentity {
            acct,
            username: body.username,
            display_name: body.display_name.filter(|name| !name.is_empty()),
            avatar_url: body.avatar,
        })
    }
}

impl IdentityPort for MastodonClient {
    fn verify_token(
        &self,
        token: &str,
    ) -> BoxFuture<'_, Result<VerifiedIdentity, IdentityError>> {
        let token = token.to_string();
        Box::pin(async move { self.fetch_identity(&token).await })
    }
}

fn account_domain(base_url: &str) -> String {
    let host = reqwest::Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default();
    format!("@{host}")
}

#[derive(Debug, Deserialize)]
struct CredentialAccount {
    acct: String,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_domain_uses_the_provider_host() {
        assert_eq!(
            account_domain("https://synapse.example.org/"),
            "@synapse.example.org"
        );
    }

    #[test]
    fn account_domain_tolerates_bad_urls() {
        assert_eq!(account_domain("not a url"), "@");
    }
}
