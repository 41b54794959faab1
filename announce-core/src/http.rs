use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::time::Duration;

/// Shared HTTP client with a bounded per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to initialize HTTP client")
}

/// Parse a base URL, making sure relative joins keep its whole path.
pub(crate) fn parse_base_url(raw: &str, what: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("Invalid {what} base URL: {raw}"))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path).with_context(|| format!("Failed to build URL for {path} from {base}"))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
