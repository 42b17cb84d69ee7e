//! Loading raw input bytes from a local path or an HTTP(S) URL.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration;

use crate::model::Station;
use crate::parser::{TripLog, parse_stations, parse_trips};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where an input collection comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(String),
    Url(String),
}

impl DataSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source.to_string())
        } else {
            Self::Path(source.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Path(s) | Self::Url(s) => s,
        }
    }

    /// Fetches the raw bytes, transparently inflating gzip payloads.
    #[tracing::instrument(fields(source = %self.as_str()))]
    pub async fn load_bytes(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Url(url) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(120))
                    .connect_timeout(Duration::from_secs(10))
                    .build()?;
                client
                    .get(url)
                    .send()
                    .await
                    .and_then(|resp| resp.error_for_status())
                    .with_context(|| format!("Failed to fetch {url}"))?
                    .bytes()
                    .await?
                    .to_vec()
            }
            Self::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {path}"))?,
        };

        tracing::debug!(bytes = bytes.len(), "Source loaded");
        maybe_gunzip(bytes)
    }
}

/// Inflates `bytes` when they start with the gzip magic number.
pub fn maybe_gunzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut decoded)
        .context("Failed to decompress gzip input")?;
    Ok(decoded)
}

/// Loads the station catalog and the trip log concurrently.
#[tracing::instrument(skip_all, fields(stations = %stations.as_str(), trips = %trips.as_str()))]
pub async fn load_inputs(
    stations: &DataSource,
    trips: &DataSource,
) -> Result<(Vec<Station>, TripLog)> {
    let (station_bytes, trip_bytes) =
        tokio::try_join!(stations.load_bytes(), trips.load_bytes())?;

    let stations = parse_stations(&station_bytes)
        .with_context(|| format!("Invalid station catalog {}", stations.as_str()))?;
    let trips = parse_trips(trip_bytes.as_slice())
        .with_context(|| format!("Invalid trip log {}", trips.as_str()))?;

    tracing::info!(
        stations = stations.len(),
        trips = trips.trips.len(),
        rejected = trips.rejected,
        "Inputs loaded"
    );
    Ok((stations, trips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(
            DataSource::parse("https://example.org/trips.csv"),
            DataSource::Url("https://example.org/trips.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/trips.csv"),
            DataSource::Path("data/trips.csv".to_string())
        );
    }

    #[test]
    fn test_plain_bytes_untouched() {
        let bytes = b"started_at,ended_at\n".to_vec();
        assert_eq!(maybe_gunzip(bytes.clone()).unwrap(), bytes);
    }

    #[test]
    fn test_gzip_bytes_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello trips").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(maybe_gunzip(compressed).unwrap(), b"hello trips");
    }

    #[tokio::test]
    async fn test_load_inputs_from_files() {
        let stations_path = temp_path("station_traffic_test_stations.json");
        let trips_path = temp_path("station_traffic_test_trips.csv.gz");

        fs::write(
            &stations_path,
            r#"{"data": {"stations": [{"short_name": "A", "lon": -71.0, "lat": 42.3}]}}"#,
        )
        .unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"started_at,ended_at,start_station_id,end_station_id\n2024-03-01 10:00:00,2024-03-01 10:30:00,A,A\n")
            .unwrap();
        fs::write(&trips_path, encoder.finish().unwrap()).unwrap();

        let (stations, log) = load_inputs(
            &DataSource::parse(&stations_path),
            &DataSource::parse(&trips_path),
        )
        .await
        .unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(log.trips.len(), 1);

        fs::remove_file(&stations_path).unwrap();
        fs::remove_file(&trips_path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = DataSource::parse(&temp_path("station_traffic_does_not_exist.csv"));
        assert!(source.load_bytes().await.is_err());
    }
}
