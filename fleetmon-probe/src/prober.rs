// SPDX-License-Identifier: MIT

use fleetmon_model::{TelemetrySample, Topology};
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;
use xml::reader::{EventReader, XmlEvent};

/// Per-node fetch budget. A node that has not answered by then yields no
/// sample.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const STATS_PATH: &str = "/xmlstats.do?include=transactions";

/// Fetches the minute-scale mean transaction count from every node of a
/// topology.
pub struct TelemetryProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for TelemetryProber {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryProber {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// One concurrent fetch per node, joined when the slowest finishes or
    /// times out. Failures (timeout, refused connection, malformed body,
    /// missing metric) become samples without a reading and never disturb
    /// sibling fetches. Once launched the probe cannot be cancelled; the
    /// per-request timeout bounds how long that can take.
    ///
    /// Sample order follows `topology.nodes`, but callers must not rely
    /// on it — evaluation treats the sequence as unordered.
    pub async fn probe(&self, topology: &Topology) -> Vec<TelemetrySample> {
        let fetches = topology.nodes.iter().map(|node| {
            let url = format!("http://{}:{}{}", node.host, node.port, STATS_PATH);
            async move {
                let mean_transactions = self.fetch_mean(&url).await;
                TelemetrySample {
                    node_url: url,
                    mean_transactions,
                }
            }
        });
        join_all(fetches).await
    }

    async fn fetch_mean(&self, url: &str) -> Option<f64> {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "telemetry fetch failed");
                return None;
            }
        };
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(url, error = %e, "telemetry body unreadable");
                return None;
            }
        };
        parse_mean_transactions(&body)
    }
}

/// Extracts the text of the `transactions.mean` element from a stats
/// document. Anything unparseable is treated as "no data".
fn parse_mean_transactions(body: &str) -> Option<f64> {
    let mut in_mean = false;
    for event in EventReader::new(body.as_bytes()) {
        match event.ok()? {
            XmlEvent::StartElement { name, .. } => {
                in_mean = name.local_name == "transactions.mean";
            }
            XmlEvent::Characters(text) if in_mean => {
                return text.trim().parse().ok();
            }
            XmlEvent::EndElement { .. } => {
                in_mean = false;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mean_from_stats_document() {
        let body = "<xmlstats><transactions.mean>4242.5</transactions.mean></xmlstats>";
        assert_eq!(parse_mean_transactions(body), Some(4242.5));
    }

    #[test]
    fn whitespace_around_value_is_tolerated() {
        let body = "<xmlstats><transactions.mean>\n  120\n</transactions.mean></xmlstats>";
        assert_eq!(parse_mean_transactions(body), Some(120.0));
    }

    #[test]
    fn missing_metric_yields_no_data() {
        let body = "<xmlstats><transactions.max>9</transactions.max></xmlstats>";
        assert_eq!(parse_mean_transactions(body), None);
    }

    #[test]
    fn malformed_document_yields_no_data() {
        assert_eq!(parse_mean_transactions("<xmlstats><oops"), None);
        assert_eq!(parse_mean_transactions("not xml at all"), None);
    }

    #[test]
    fn non_numeric_value_yields_no_data() {
        let body = "<xmlstats><transactions.mean>n/a</transactions.mean></xmlstats>";
        assert_eq!(parse_mean_transactions(body), None);
    }
}
