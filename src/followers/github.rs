use super::{FollowerPage, FollowerSource};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

pub struct GithubSource {
    token: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GithubApiUser {
    login: String,
}

impl GithubSource {
    /// A blank token is rejected up front rather than sending anonymous requests.
    pub fn new(token: String, api_base: impl Into<String>) -> Result<Self, FetchError> {
        if token.trim().is_empty() {
            return Err(FetchError::Auth);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("gh-followers/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            token,
            api_base: api_base.into(),
            client,
        })
    }

    fn followers_url(&self, user: &str) -> String {
        format!(
            "{}/users/{}/followers",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(user)
        )
    }
}

#[async_trait]
impl FollowerSource for GithubSource {
    async fn fetch_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<FollowerPage, FetchError> {
        let response = self
            .client
            .get(self.followers_url(user))
            .query(&[("page", page), ("per_page", per_page)])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &headers, body));
        }

        let users: Vec<GithubApiUser> =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse {
                status: status.as_u16(),
                body: format!("unexpected followers payload: {e}"),
            })?;

        Ok(FollowerPage {
            logins: users.into_iter().map(|u| u.login).collect(),
            next_page: headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_from_link),
        })
    }
}

/// Map a non-success response onto the fetch error taxonomy.
///
/// GitHub signals the primary limit with 403 and `x-ratelimit-remaining: 0`,
/// secondary limits with 403 or 429 and a "rate limit" message.
fn classify_failure(status: StatusCode, headers: &HeaderMap, body: String) -> FetchError {
    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::UNAUTHORIZED => FetchError::Auth,
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        StatusCode::FORBIDDEN if exhausted || body.to_lowercase().contains("rate limit") => {
            FetchError::RateLimited
        }
        _ => FetchError::InvalidResponse {
            status: status.as_u16(),
            body,
        },
    }
}

/// Extract the `page` query parameter of the `rel="next"` entry of a `Link` header.
fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        if !parts.any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let url = Url::parse(target.strip_prefix('<')?.strip_suffix('>')?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
