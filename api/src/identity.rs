use std::future::Future;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("request carried no access token")]
    MissingToken,
    #[error("identity service rejected the token ({0})")]
    Rejected(StatusCode),
    #[error("identity response had no user id")]
    MissingUserId,
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Resolves a linked-account access token into the CRM user id.
pub trait IdentityProvider: Send + Sync {
    fn resolve_identity(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<String, IdentityError>> + Send;
}

/// Identity lookup against the Salesforce OAuth `userinfo` endpoint.
#[derive(Clone)]
pub struct SalesforceIdentity {
    client: reqwest::Client,
    userinfo_url: Url,
}

#[derive(Deserialize)]
struct UserInfo {
    #[serde(default)]
    user_id: Option<String>,
}

impl SalesforceIdentity {
    pub fn new(login_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            userinfo_url: login_url.join("/services/oauth2/userinfo")?,
        })
    }
}

impl IdentityProvider for SalesforceIdentity {
    async fn resolve_identity(&self, access_token: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status));
        }

        let info: UserInfo = response.json().await?;
        info.user_id
            .filter(|id| !id.is_empty())
            .ok_or(IdentityError::MissingUserId)
    }
}
