//! Extraction providers, tried in order by the orchestrator. Site-specific
//! ones first, then the generic HTML fetch, then the remote fallbacks that
//! cost API quota.

use reqwest::Client;
use url::Url;

use crate::extractor::ExtractConfig;
use crate::types::ProviderResponse;

pub mod fnac;
pub mod galeries;
pub mod generic;
pub mod scraperapi;
pub mod serper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Fnac,
    Galeries,
    Generic,
    ScraperApi,
    Serper,
}

impl Provider {
    pub async fn run(
        self,
        client: &Client,
        config: &ExtractConfig,
        url: &Url,
    ) -> ProviderResponse {
        match self {
            Self::Fnac => fnac::extract(client, url).await,
            Self::Galeries => galeries::extract(client, url).await,
            Self::Generic => generic::extract(client, config, url).await,
            Self::ScraperApi => scraperapi::extract(client, config, url).await,
            Self::Serper => serper::extract(client, config, url).await,
        }
    }
}

/// Build the ordered provider chain for one URL: matching site-specific
/// providers, the generic fetch, then whichever remote fallbacks have keys
/// configured.
#[must_use]
pub fn provider_chain(url: &Url, config: &ExtractConfig) -> Vec<Provider> {
    let mut chain = Vec::new();
    if fnac::matches(url) {
        chain.push(Provider::Fnac);
    }
    if galeries::matches(url) {
        chain.push(Provider::Galeries);
    }
    chain.push(Provider::Generic);
    if config.scraper_api_key.is_some() {
        chain.push(Provider::ScraperApi);
    }
    if config.serper_api_key.is_some() {
        chain.push(Provider::Serper);
    }
    chain
}
