use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{info, warn};

use crate::http_cache::{app_cache_dir, match_cache_path, read_cached, write_cached};
use crate::http_client::http_client;

pub const MATCH_API_URL: &str = "https://api.liquipedia.net/api/v3/match";
const WIKI: &str = "mobilelegends";
const PAGE_LIMIT: &str = "500";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Live,
    Cache,
}

#[derive(Debug, Clone)]
pub struct FetchedMatches {
    pub records: Vec<Value>,
    pub source: MatchSource,
    pub cache_path: Option<PathBuf>,
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var("LIQUIPEDIA_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub fn parent_condition(tournament_path: &str) -> String {
    format!("[[parent::{tournament_path}]]")
}

/// Fetches every match under one tournament page. A successful response is
/// cached; on any failure the last cached copy is served instead.
pub fn fetch_tournament_matches(tournament_path: &str, api_key: Option<&str>) -> Result<FetchedMatches> {
    let cache_path = app_cache_dir().map(|dir| match_cache_path(&dir, tournament_path));

    let live = match api_key {
        Some(key) => fetch_live(tournament_path, key),
        None => Err(anyhow!("LIQUIPEDIA_API_KEY not set")),
    };

    match live {
        Ok(records) => {
            if let Some(path) = &cache_path {
                let body = serde_json::to_string(&records)?;
                if let Err(err) = write_cached(path, &body) {
                    warn!(error = %err, path = %path.display(), "match cache write failed");
                }
            }
            info!(tournament = tournament_path, matches = records.len(), "fetched matches");
            Ok(FetchedMatches {
                records,
                source: MatchSource::Live,
                cache_path,
            })
        }
        Err(err) => {
            warn!(error = %err, tournament = tournament_path, "live fetch failed, trying cache");
            let path = cache_path
                .clone()
                .ok_or_else(|| anyhow!("no cache dir available after fetch failure: {err}"))?;
            let raw = read_cached(&path)
                .with_context(|| format!("no cached matches at {} ({err})", path.display()))?;
            let records = records_from_body(&raw)?;
            Ok(FetchedMatches {
                records,
                source: MatchSource::Cache,
                cache_path,
            })
        }
    }
}

fn fetch_live(tournament_path: &str, api_key: &str) -> Result<Vec<Value>> {
    let client = http_client()?;
    let condition = parent_condition(tournament_path);
    let resp = client
        .get(MATCH_API_URL)
        .query(&[("wiki", WIKI), ("limit", PAGE_LIMIT), ("conditions", condition.as_str())])
        .header(AUTHORIZATION, format!("Apikey {api_key}"))
        .send()
        .context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("match api returned {status}"));
    }
    let body = resp.text().context("read body failed")?;
    records_from_body(&body)
}

/// The API wraps records in `{"result": [...]}`; the cache stores the bare array.
pub fn records_from_body(raw: &str) -> Result<Vec<Value>> {
    let v: Value = serde_json::from_str(raw).context("invalid match json")?;
    match v {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(anyhow!("match response has no result array")),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(anyhow!("unexpected match response shape")),
    }
}
