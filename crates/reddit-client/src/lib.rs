//! Reddit post source.
//!
//! Authenticates with the script-app client-credentials flow, then walks the
//! subreddit's hot listing page by page until the requested number of posts
//! has been collected.

use async_trait::async_trait;
use pulse_core::{Post, PostSource, PulseError, PulseResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Reddit caps listing pages at 100 items.
const PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    subreddit: String,
}

impl RedditClient {
    pub fn new(
        client_id: String,
        client_secret: String,
        user_agent: String,
        subreddit: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            client_id,
            client_secret,
            user_agent,
            subreddit,
        }
    }

    async fn access_token(&self) -> PulseResult<String> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PulseError::PostSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PulseError::PostSource(format!(
                "token request failed: HTTP {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PulseError::PostSource(e.to_string()))?;

        Ok(token.access_token)
    }

    async fn fetch_page(
        &self,
        token: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> PulseResult<ListingData> {
        let url = format!("{}/r/{}/hot", API_BASE_URL, self.subreddit);

        let mut query = vec![("limit", page_size.to_string()), ("raw_json", "1".to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&query)
            .send()
            .await
            .map_err(|e| PulseError::PostSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PulseError::PostSource(format!(
                "hot listing failed: HTTP {}",
                response.status()
            )));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| PulseError::PostSource(e.to_string()))?;

        Ok(listing.data)
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn hot_posts(&self, limit: usize) -> PulseResult<Vec<Post>> {
        let token = self.access_token().await?;

        let mut posts = Vec::with_capacity(limit);
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let page_size = PAGE_SIZE.min(limit - posts.len());
            let page = self.fetch_page(&token, page_size, after.as_deref()).await?;

            if page.children.is_empty() {
                break;
            }

            tracing::debug!(
                "r/{}: fetched page of {} posts ({} total)",
                self.subreddit,
                page.children.len(),
                posts.len() + page.children.len()
            );

            posts.extend(page.children.into_iter().map(|child| Post {
                title: child.data.title,
                body: child.data.selftext,
            }));

            after = page.after;
            if after.is_none() {
                break;
            }
        }

        posts.truncate(limit);
        tracing::info!("r/{}: collected {} hot posts", self.subreddit, posts.len());
        Ok(posts)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    title: String,
    #[serde(default)]
    selftext: String,
}
