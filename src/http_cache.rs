use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const CACHE_DIR: &str = "mlbb_playoff_odds";

/// `MATCH_CACHE_DIR`, else `$XDG_CACHE_HOME/mlbb_playoff_odds`, else
/// `~/.cache/mlbb_playoff_odds`.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("MATCH_CACHE_DIR") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn safe_cache_key(key: &str) -> String {
    key.replace(['/', '\\'], "_")
}

pub fn match_cache_path(dir: &Path, tournament_path: &str) -> PathBuf {
    dir.join(format!("matches_{}.json", safe_cache_key(tournament_path)))
}

pub fn read_cached(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    if raw.trim().is_empty() { None } else { Some(raw) }
}

/// Write-then-rename so a crash never leaves a half-written cache file.
pub fn write_cached(path: &Path, body: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create cache dir {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).context("write match cache")?;
    fs::rename(&tmp, path).context("swap match cache")?;
    Ok(())
}
