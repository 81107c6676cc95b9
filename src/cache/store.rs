//! JSON file persistence shared by both caches.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Serde codec for `YYYY-MM-DDTHH:MM:SS.mmmZ` timestamps.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize with millisecond precision and a `Z` suffix.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Parse any RFC 3339 timestamp back into UTC.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Eviction threshold for a max age in days, or `None` when eviction is off.
///
/// Ages that are not positive or that reach past the representable date range
/// disable eviction.
pub fn eviction_threshold(now: DateTime<Utc>, max_age_days: Option<f64>) -> Option<DateTime<Utc>> {
    let days = max_age_days.filter(|d| d.is_finite() && *d > 0.0)?;
    let millis = days * 86_400_000.0;
    // Beyond this the cast below would saturate
    if millis >= 9.0e18 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let age = chrono::Duration::try_milliseconds(millis as i64)?;
    now.checked_sub_signed(age)
}

/// Read a JSON map from `path`.
///
/// A missing file is a cold cache and yields the default value. A file that
/// cannot be read or parsed is logged and also yields the default, so a
/// corrupt cache never blocks resolution.
pub async fn read_json<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Cache file {} not found, starting empty", path.display());
            return T::default();
        }
        Err(e) => {
            tracing::error!("Failed to read cache file {}: {e}", path.display());
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Malformed cache file {}: {e}", path.display());
            T::default()
        }
    }
}

/// Write `value` as pretty JSON, creating the parent directory if needed.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io(e, dir.to_path_buf()))?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| Error::json(e, path.to_path_buf()))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::io(e, path.to_path_buf()))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Whether a record cached at `cached_on` survives eviction.
pub fn is_fresh(cached_on: DateTime<Utc>, threshold: Option<DateTime<Utc>>) -> bool {
    threshold.map_or(true, |t| cached_on >= t)
}
