//! Two-phase host probe.
//!
//! A host is fetched over plain HTTP first. If that redirect chain already
//! ends on an `https://` URL the host is recorded as HTTPS-only and no second
//! connection is made; otherwise the host is fetched again over HTTPS.
//!
//! Fetch failures never escape the prober: they become the `error` string of
//! the host's [`HostResult`], alongside whatever hops were captured before the
//! failure.

use std::sync::Arc;

use log::debug;

use crate::app::probe_url;
use crate::config::HTTP_STATUS_OK;
use crate::error_handling::{update_error_stats, FetchError, InfoType, ProcessingStats};
use crate::models::HostResult;
use crate::transport::{fetch, Fetch, FetchSettings, RoundTrip};

/// Probes hosts through a shared transport. Shared by all workers.
pub struct HostProber {
    transport: Arc<dyn RoundTrip>,
    settings: FetchSettings,
    stats: Arc<ProcessingStats>,
}

impl HostProber {
    pub fn new(
        transport: Arc<dyn RoundTrip>,
        settings: FetchSettings,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            transport,
            settings,
            stats,
        }
    }

    #[cfg(test)]
    fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Produces exactly one result for `host`, making at most two fetches.
    pub async fn probe(&self, host: &str) -> HostResult {
        let mut result = HostResult::new(host);

        let http = self.fetch_observed(&probe_url("http", host)).await;
        let (terminal_url, terminal_status) = terminal_of(&http);
        result.http_observations = http.observations;
        if let Some(error) = http.error {
            return self.fail(result, error);
        }
        result.final_location = terminal_url;
        result.http_ok = terminal_status == HTTP_STATUS_OK;

        if result.final_location.starts_with("https://") {
            debug!("{host}: HTTP probe landed on {}", result.final_location);
            result.https_only = true;
            result.https_ok = result.http_ok;
            return self.finish(result);
        }

        let https = self.fetch_observed(&probe_url("https", host)).await;
        let (terminal_url, terminal_status) = terminal_of(&https);
        result.https_observations = https.observations;
        if let Some(error) = https.error {
            return self.fail(result, error);
        }
        result.final_location = terminal_url;
        result.https_ok = terminal_status == HTTP_STATUS_OK;

        self.finish(result)
    }

    async fn fetch_observed(&self, url: &str) -> Fetch {
        require_observations(url, fetch(Arc::clone(&self.transport), url, &self.settings).await)
    }

    fn fail(&self, mut result: HostResult, error: FetchError) -> HostResult {
        debug!("{}: {error}", result.host);
        update_error_stats(&self.stats, &error);
        result.error = Some(error.to_string());
        result.final_location = last_hop_url(&result);
        self.finish(result)
    }

    fn finish(&self, result: HostResult) -> HostResult {
        if result.http_ok {
            self.stats.increment_info(InfoType::HttpOk);
        }
        if result.https_ok {
            self.stats.increment_info(InfoType::HttpsOk);
        }
        if result.https_only {
            self.stats.increment_info(InfoType::HttpsOnly);
        }
        if result.http_observations.len() > 1 || result.https_observations.len() > 1 {
            self.stats.increment_info(InfoType::Redirected);
        }
        result
    }
}

/// A fetch that succeeded without recording any hop is treated as failed.
fn require_observations(url: &str, mut outcome: Fetch) -> Fetch {
    if outcome.error.is_none() && outcome.observations.is_empty() {
        outcome.error = Some(FetchError::NoObservations(url.to_string()));
    }
    outcome
}

fn terminal_of(outcome: &Fetch) -> (String, u16) {
    outcome
        .terminal()
        .map(|hop| (hop.request_url.clone(), hop.status))
        .unwrap_or_default()
}

/// URL of the last hop in whichever sequence was populated last.
fn last_hop_url(result: &HostResult) -> String {
    result
        .https_observations
        .last()
        .or_else(|| result.http_observations.last())
        .map(|hop| hop.request_url.clone())
        .unwrap_or_default()
}
