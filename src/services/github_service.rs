use serde_json::Value;

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// Any non-200 upstream response, surfaced as a missing profile
    #[error("No github profile found")]
    NotFound,

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Read-only lookup of a user's public repositories on GitHub, used to
/// augment profile pages.
pub struct GithubService {
    client: reqwest::Client,
}

impl GithubService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the five most recently created public repos for a username.
    pub async fn repos(&self, username: &str) -> Result<Value, GithubError> {
        let mut url = format!(
            "https://api.github.com/users/{}/repos?per_page=5&sort=created:asc",
            username
        );

        let github = &config::config().github;
        if let (Some(id), Some(secret)) = (&github.client_id, &github.client_secret) {
            url.push_str(&format!("&client_id={}&client_secret={}", id, secret));
        }

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, "devlink-api")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GithubError::NotFound);
        }

        Ok(response.json::<Value>().await?)
    }
}
