//! Sequences the three stage services over HTTP and times each phase.
//!
//! The driver is the only place with any notion of a "run": it splits once,
//! fans the chunks out round-robin across the mapper endpoints, and reduces
//! whatever tables came back. A failed map is logged and that chunk is left
//! out; a failed split or reduce fails the run.

use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Context, Result};
use futures::future::join_all;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::server::{ErrorBody, MapResponse, ReduceRequest, ReduceResponse, SplitResponse};

#[derive(Clone, Debug)]
pub struct Driver {
    http: Client,
    splitter: String,
    mappers: Vec<String>,
    reducer: String,
}

/// Wall-clock time spent in each phase of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseTimings {
    pub split: Duration,
    pub map: Duration,
    pub reduce: Duration,
    pub total: Duration,
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub chunk_urls: Vec<String>,
    pub table_urls: Vec<String>,
    /// Chunks whose map call failed.
    pub skipped: Vec<String>,
    pub final_url: String,
    pub timings: PhaseTimings,
}

impl Driver {
    /// Endpoints may be given as `host:port` or as full `http://` URLs.
    pub fn new(splitter: &str, mappers: &[String], reducer: &str) -> Result<Self> {
        ensure!(!mappers.is_empty(), "at least one mapper endpoint is required");
        Ok(Self {
            http: Client::new(),
            splitter: base_url(splitter),
            mappers: mappers.iter().map(|m| base_url(m)).collect(),
            reducer: base_url(reducer),
        })
    }

    pub async fn split(&self, source_url: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/split", self.splitter))
            .query(&[("source_url", source_url)])
            .send()
            .await
            .context("splitter unreachable")?;
        let body: SplitResponse = decode("split", response).await?;
        Ok(body.chunk_urls)
    }

    /// Map one chunk on mapper `slot`, wrapping around the pool.
    pub async fn map_chunk(&self, slot: usize, chunk_url: &str) -> Result<String> {
        let mapper = &self.mappers[slot % self.mappers.len()];
        let response = self
            .http
            .get(format!("{mapper}/map"))
            .query(&[("chunk_url", chunk_url)])
            .send()
            .await
            .with_context(|| format!("mapper {mapper} unreachable"))?;
        let body: MapResponse = decode("map", response).await?;
        Ok(body.result_url)
    }

    pub async fn reduce(
        &self,
        table_urls: Vec<String>,
        default_bucket: Option<String>,
    ) -> Result<String> {
        let request = ReduceRequest {
            mapper_urls: Some(table_urls),
            default_bucket,
        };
        let response = self
            .http
            .post(format!("{}/reduce", self.reducer))
            .json(&request)
            .send()
            .await
            .context("reducer unreachable")?;
        let body: ReduceResponse = decode("reduce", response).await?;
        Ok(body.final_result_url)
    }

    /// Run the whole pipeline once for `source_url`.
    pub async fn run(&self, source_url: &str, default_bucket: Option<&str>) -> Result<RunOutcome> {
        let total_start = Instant::now();

        let split_start = Instant::now();
        let chunk_urls = self.split(source_url).await?;
        let split = split_start.elapsed();
        info!("split into {} chunks in {:?}", chunk_urls.len(), split);

        let map_start = Instant::now();
        let calls = chunk_urls
            .iter()
            .enumerate()
            .map(|(i, chunk)| self.map_chunk(i, chunk));
        let results = join_all(calls).await;
        let map = map_start.elapsed();

        let mut table_urls = Vec::with_capacity(chunk_urls.len());
        let mut skipped = Vec::new();
        for (chunk, result) in chunk_urls.iter().zip(results) {
            match result {
                Ok(table) => table_urls.push(table),
                Err(e) => {
                    warn!("map of {chunk} failed, leaving it out: {e:#}");
                    skipped.push(chunk.clone());
                }
            }
        }
        info!("mapped {} chunks in {:?}", table_urls.len(), map);

        let reduce_start = Instant::now();
        let final_url = self
            .reduce(table_urls.clone(), default_bucket.map(str::to_string))
            .await?;
        let reduce = reduce_start.elapsed();

        Ok(RunOutcome {
            chunk_urls,
            table_urls,
            skipped,
            final_url,
            timings: PhaseTimings {
                split,
                map,
                reduce,
                total: total_start.elapsed(),
            },
        })
    }

    pub fn mapper_count(&self) -> usize {
        self.mappers.len()
    }
}

fn base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Turn a stage response into its success body, or into an error carrying the
/// stage's code and message.
async fn decode<T: DeserializeOwned>(stage: &str, response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .with_context(|| format!("{stage} returned an unreadable body"));
    }
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { code, message }) => bail!("{stage} failed ({status}, {code}): {message}"),
        Err(_) => bail!("{stage} failed with {status}"),
    }
}

/// Averages over several runs, plus the speedup over mapping sequentially.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub average: PhaseTimings,
    /// `split + map * mappers + reduce`: the time if the map calls had run
    /// one after another on a single mapper.
    pub sequential_estimate: Duration,
    pub speedup: f64,
}

impl Summary {
    pub fn from_runs(runs: &[PhaseTimings], mappers: usize) -> Option<Self> {
        let n = u32::try_from(runs.len()).ok().filter(|n| *n > 0)?;
        let sum = |f: fn(&PhaseTimings) -> Duration| runs.iter().map(f).sum::<Duration>() / n;
        let average = PhaseTimings {
            split: sum(|t| t.split),
            map: sum(|t| t.map),
            reduce: sum(|t| t.reduce),
            total: sum(|t| t.total),
        };
        let sequential_estimate =
            average.split + average.map * u32::try_from(mappers).ok()? + average.reduce;
        let speedup = if average.total.is_zero() {
            0.0
        } else {
            sequential_estimate.as_secs_f64() / average.total.as_secs_f64()
        };
        Some(Self {
            average,
            sequential_estimate,
            speedup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_endpoints() {
        assert_eq!(base_url("10.0.0.1:8080"), "http://10.0.0.1:8080");
        assert_eq!(base_url("http://mapper:8080/"), "http://mapper:8080");
        assert_eq!(base_url("https://reducer"), "https://reducer");
    }

    #[test]
    fn needs_a_mapper() {
        assert!(Driver::new("s:1", &[], "r:1").is_err());
    }

    #[test]
    fn summary_averages_runs() {
        let run = |split, map, reduce, total| PhaseTimings {
            split: Duration::from_millis(split),
            map: Duration::from_millis(map),
            reduce: Duration::from_millis(reduce),
            total: Duration::from_millis(total),
        };
        let runs = [run(10, 100, 20, 130), run(30, 300, 40, 370)];
        let summary = Summary::from_runs(&runs, 3).unwrap();
        assert_eq!(summary.average, run(20, 200, 30, 250));
        assert_eq!(summary.sequential_estimate, Duration::from_millis(650));
        assert!((summary.speedup - 2.6).abs() < 1e-9);
    }

    #[test]
    fn summary_of_nothing_is_none() {
        assert!(Summary::from_runs(&[], 3).is_none());
    }
}
