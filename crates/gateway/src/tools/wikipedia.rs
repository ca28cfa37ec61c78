//! Wikipedia summary lookups via the REST `page/summary` endpoint.

use std::time::Duration;

use serde_json::Value;

use gl_domain::error::{Error, Result};

const SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const USER_AGENT: &str = concat!("greenlight/", env!("CARGO_PKG_VERSION"));

/// Client for Wikipedia's REST summary API.
pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: SUMMARY_ENDPOINT.to_string(),
        })
    }

    /// Fetch the lead summary for a topic. Topics are matched by title, so
    /// `"Ada Lovelace"` resolves the article of that name.
    pub async fn summary(&self, topic: &str) -> Result<String> {
        let title = title_path(topic);
        let url = format!("{}/{}", self.base_url, title);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "wikipedia summary for '{topic}': HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        body["extract"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::Http(format!("wikipedia summary for '{topic}': no extract")))
    }
}

/// Turn a free-text topic into a summary-endpoint path segment.
fn title_path(topic: &str) -> String {
    let underscored = topic.trim().replace(' ', "_");
    // Percent-encode everything outside the unreserved set; underscores and
    // parentheses are fine in article titles.
    let mut out = String::with_capacity(underscored.len());
    for byte in underscored.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'(' | b')' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(title_path("Ada Lovelace"), "Ada_Lovelace");
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        assert_eq!(title_path("AC/DC"), "AC%2FDC");
        assert_eq!(title_path("Café de Flore"), "Caf%C3%A9_de_Flore");
    }

    #[test]
    fn parenthesized_titles_pass_through() {
        assert_eq!(title_path("Lincoln (film)"), "Lincoln_(film)");
    }
}
