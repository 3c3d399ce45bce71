use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One timed API call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeSample {
    /// Method plus templated path, e.g. `GET /lost-items/{id}`
    pub endpoint_key: String,
    /// Seconds
    pub duration: f64,
}

/// Latency aggregate for one endpoint key (seconds)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: u32,
}

/// Accumulates response times for the whole run. Never reset mid-run.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    samples: Vec<ResponseTimeSample>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, endpoint_key: impl Into<String>, duration: Duration) {
        self.samples.push(ResponseTimeSample {
            endpoint_key: endpoint_key.into(),
            duration: duration.as_secs_f64(),
        });
    }

    pub fn samples(&self) -> &[ResponseTimeSample] {
        &self.samples
    }

    pub fn summary(&self) -> BTreeMap<String, EndpointStats> {
        let mut stats: BTreeMap<String, EndpointStats> = BTreeMap::new();

        for sample in &self.samples {
            stats
                .entry(sample.endpoint_key.clone())
                .and_modify(|s| {
                    // avg holds the running sum until the final pass below
                    s.avg += sample.duration;
                    s.min = s.min.min(sample.duration);
                    s.max = s.max.max(sample.duration);
                    s.count += 1;
                })
                .or_insert(EndpointStats {
                    avg: sample.duration,
                    min: sample.duration,
                    max: sample.duration,
                    count: 1,
                });
        }

        for s in stats.values_mut() {
            s.avg /= s.count as f64;
        }
        stats
    }
}
