use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Profile the identity provider vouches for when a federated token checks
/// out.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedProfile {
    #[serde(rename = "sub")]
    pub subject_id: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default, rename = "picture")]
    pub picture_url: Option<String>,
}

/// Third-party identity verification. The call itself is external; the
/// application only consumes this interface.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<FederatedProfile>;
}

/// Exchanges the presented token for the provider's userinfo document.
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    userinfo_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(userinfo_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url: userinfo_url.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<FederatedProfile> {
        let resp = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await
            .context("identity userinfo request")?;

        if !resp.status().is_success() {
            anyhow::bail!("identity provider rejected the token: {}", resp.status());
        }

        let profile = resp
            .json::<FederatedProfile>()
            .await
            .context("identity userinfo body")?;
        debug!(subject = %profile.subject_id, "federated token verified");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_standard_userinfo_document() {
        let raw = r#"{
            "sub": "10987654321",
            "email": "ana@example.com",
            "given_name": "Ana",
            "family_name": "Silva",
            "picture": "https://cdn.example.com/p/ana.jpg"
        }"#;
        let profile: FederatedProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.subject_id, "10987654321");
        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(profile.given_name.as_deref(), Some("Ana"));
        assert_eq!(profile.picture_url.as_deref(), Some("https://cdn.example.com/p/ana.jpg"));
    }

    #[test]
    fn profile_tolerates_missing_optional_fields() {
        let raw = r#"{"sub": "x1", "email": "min@example.com"}"#;
        let profile: FederatedProfile = serde_json::from_str(raw).unwrap();
        assert!(profile.given_name.is_none());
        assert!(profile.family_name.is_none());
        assert!(profile.picture_url.is_none());
    }
}
