use anyhow::{Context, Result, bail};
use mealcard_client::SessionConfig;
use mealcard_core::Credentials;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub session: SessionConfig,
}

pub fn load_config(base_url: &str, card_id: &str) -> Result<RunConfig> {
    resolve(|key| std::env::var(key).ok(), base_url, card_id)
}

/// Everything the run needs, checked up front so a bad setup never reaches
/// the network.
pub fn resolve<F>(lookup: F, base_url: &str, card_id: &str) -> Result<RunConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup).context("reading credentials")?;

    let base_url = base_url.trim().trim_end_matches('/');
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        bail!("base url must start with http:// or https://, got {base_url:?}");
    }

    let card_id = card_id.trim();
    if card_id.is_empty() || !card_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("card id must be a non-empty alphanumeric string, got {card_id:?}");
    }

    Ok(RunConfig {
        credentials,
        session: SessionConfig {
            base_url: base_url.to_string(),
            card_id: card_id.to_string(),
        },
    })
}
