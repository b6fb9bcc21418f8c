use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::WrapErr;
use tracing::info;

use crate::model::FeedEnvelope;

pub fn write_feed(path: impl AsRef<Path>, feed: &FeedEnvelope) -> eyre::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(feed)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;

    info!(records = feed.data.len(), path = %path.display(), "feed written");

    Ok(())
}

pub trait FeedSource {
    fn fetch(&self) -> eyre::Result<FeedEnvelope>;
}

/// Reads a feed from disk. Every `Date` must be RFC 3339; one record that
/// is not fails the whole fetch.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> eyre::Result<FeedEnvelope> {
        let raw = fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("failed to read {}", self.path.display()))?;
        let feed = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("failed to parse {}", self.path.display()))?;

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};

    use super::{write_feed, FeedSource, FileFeed};
    use crate::model::{FeedEnvelope, StockRecord};

    fn feed() -> FeedEnvelope {
        FeedEnvelope::new(vec![StockRecord {
            stock_code: "BBCA".into(),
            stock_name: "Bank Central Asia Tbk.".into(),
            date: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
            close: Some(9_875.0),
            change: Some(-25.0),
            volume: Some(12_500_000.0),
            value: None,
            frequency: Some(8_421.0),
        }])
    }

    #[test]
    fn unittest_written_feed_reloads() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data").join("stocks.json");

        write_feed(&path, &feed())?;

        assert_eq!(FileFeed::new(&path).fetch()?, feed());
        Ok(())
    }

    #[test]
    fn unittest_write_overwrites_and_pretty_prints() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stocks.json");
        fs::write(&path, "stale content that is much longer than nothing at all")?;

        write_feed(&path, &FeedEnvelope::new(Vec::new()))?;

        let written = fs::read_to_string(&path)?;
        assert!(written.starts_with("{\n  \"draw\": 0,\n  \"recordsTotal\": 0,"));
        assert!(!written.contains("stale"));
        Ok(())
    }

    #[test]
    fn unittest_fetch_errors() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(FileFeed::new(dir.path().join("missing.json")).fetch().is_err());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "<html>not found</html>")?;
        assert!(FileFeed::new(&garbage).fetch().is_err());

        Ok(())
    }

    #[test]
    fn unittest_fetch_rejects_non_rfc3339_date() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stocks.json");
        fs::write(
            &path,
            r#"{"data": [
                {"StockCode": "BBCA", "StockName": "Bank Central Asia Tbk.", "Date": "2026-01-15T00:00:00.000Z"},
                {"StockCode": "TLKM", "StockName": "Telkom Indonesia Tbk.", "Date": "15 Jan 2026"}
            ]}"#,
        )?;

        let err = FileFeed::new(&path).fetch().unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));

        Ok(())
    }
}
