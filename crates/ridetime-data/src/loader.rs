//! Trip table loading from remote URLs or local parquet files.

use crate::cache::{DownloadCache, default_cache_dir};
use crate::error::{DataError, Result};
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Monthly files run to a few hundred megabytes.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent with download requests
const USER_AGENT: &str = concat!("ridetime/", env!("CARGO_PKG_VERSION"));

/// Where a trip table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripSource {
    /// HTTP or HTTPS URL
    Remote(String),
    /// Parquet file on the local filesystem
    Local(PathBuf),
}

impl TripSource {
    /// Classify a source identifier by its scheme.
    pub fn parse(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(source.to_string())
        } else {
            Self::Local(PathBuf::from(source))
        }
    }
}

impl fmt::Display for TripSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whether to use the download cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cached files).
    pub force_refresh: bool,
    /// Cache location; the platform cache directory when `None`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
            cache_dir: None,
        }
    }
}

impl FetchConfig {
    /// Configuration that never touches the cache.
    pub const fn uncached() -> Self {
        Self {
            use_cache: false,
            force_refresh: false,
            cache_dir: None,
        }
    }
}

/// Reads trip tables into memory.
#[derive(Debug)]
pub struct TripLoader {
    client: reqwest::Client,
    cache: Option<DownloadCache>,
    force_refresh: bool,
}

impl TripLoader {
    /// Create a loader.
    ///
    /// A cache directory that cannot be created disables caching with a
    /// warning rather than failing.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(DataError::Network)?;

        let cache = if config.use_cache {
            let dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
            match DownloadCache::open(&dir) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(error = %e, "download cache disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            client,
            cache,
            force_refresh: config.force_refresh,
        })
    }

    /// Cache in use, if any.
    pub const fn cache(&self) -> Option<&DownloadCache> {
        self.cache.as_ref()
    }

    /// Read one trip table.
    ///
    /// Errors from the network, filesystem, or parquet decoder are returned
    /// as-is. There is no retry.
    pub async fn read_data(&self, source: &TripSource) -> Result<DataFrame> {
        let df = match source {
            TripSource::Remote(url) => self.read_remote(url).await?,
            TripSource::Local(path) => read_parquet_file(path)?,
        };
        info!(
            source = %source,
            rows = df.height(),
            columns = df.width(),
            "loaded trip table"
        );
        Ok(df)
    }

    async fn read_remote(&self, url: &str) -> Result<DataFrame> {
        if let Some(cache) = &self.cache
            && !self.force_refresh
        {
            match cache.get(url) {
                Ok(Some(bytes)) => match read_parquet_bytes(bytes) {
                    Ok(df) => return Ok(df),
                    Err(e) => {
                        warn!(url, error = %e, "discarding unreadable cached file");
                        if let Err(e) = cache.invalidate(url) {
                            warn!(url, error = %e, "failed to remove cached file");
                        }
                    }
                },
                Ok(None) => {}
                Err(e) => warn!(url, error = %e, "cache lookup failed"),
            }
        }

        let bytes = self.download(url).await?;

        // Decode before caching so a truncated body is never stored.
        let df = read_parquet_bytes(bytes.clone())?;
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(url, &bytes)
        {
            warn!(url, error = %e, "failed to cache download");
        }
        Ok(df)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "downloading");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Decode an in-memory parquet file.
pub fn read_parquet_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let df = ParquetReader::new(Cursor::new(bytes)).finish()?;
    Ok(df)
}

/// Read a parquet file from disk.
pub fn read_parquet_file(path: &Path) -> Result<DataFrame> {
    let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("PUlocationID".into(), [Some(1.0), None, Some(3.0)]),
            Column::new("DOlocationID".into(), [Some(4.0), Some(5.0), None]),
        ])
        .unwrap()
    }

    fn parquet_bytes(df: &mut DataFrame) -> Vec<u8> {
        let mut buf = Vec::new();
        ParquetWriter::new(&mut buf).finish(df).unwrap();
        buf
    }

    #[rstest]
    #[case("https://nyc-tlc.s3.amazonaws.com/x.parquet", true)]
    #[case("HTTP://host/x.parquet", true)]
    #[case("/data/x.parquet", false)]
    #[case("data/x.parquet", false)]
    fn test_source_parse(#[case] input: &str, #[case] remote: bool) {
        assert_eq!(matches!(TripSource::parse(input), TripSource::Remote(_)), remote);
        assert_eq!(TripSource::parse(input).to_string(), input);
    }

    #[test]
    fn test_read_parquet_bytes() {
        let mut df = sample_frame();
        let bytes = parquet_bytes(&mut df);
        let read = read_parquet_bytes(bytes).unwrap();
        assert!(read.equals_missing(&df));
    }

    #[test]
    fn test_read_garbage_bytes_fails() {
        assert!(read_parquet_bytes(b"not parquet".to_vec()).is_err());
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let loader = TripLoader::new(&FetchConfig::uncached()).unwrap();
        let source = TripSource::parse("/definitely/not/here.parquet");
        let result = loader.read_data(&source).await;
        assert!(matches!(result, Err(DataError::Io { .. })));
    }

    #[tokio::test]
    async fn test_remote_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            use_cache: true,
            force_refresh: false,
            cache_dir: Some(dir.path().to_path_buf()),
        };
        let loader = TripLoader::new(&config).unwrap();

        let url = "https://invalid.example/trip+data/fhv_tripdata_2022-01.parquet";
        let mut df = sample_frame();
        loader
            .cache()
            .unwrap()
            .put(url, &parquet_bytes(&mut df))
            .unwrap();

        let read = loader.read_data(&TripSource::parse(url)).await.unwrap();
        assert_eq!(read.height(), 3);
    }
}
