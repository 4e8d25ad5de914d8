use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Polling interval used when none, or a non-positive one, is configured.
pub const DEFAULT_POLLING_RATE_SECONDS: i64 = 300;

/// Settings for a [crate::Poller].
///
/// Deserializes from `{"key": ..., "pollingRateSeconds": ..., "serializeSegments": ...}`; use
/// [PollerConfigBuilder] to construct one in code.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollerConfig {
    key: String,
    #[serde(
        rename = "pollingRateSeconds",
        default = "default_polling_interval",
        deserialize_with = "deserialize_polling_rate"
    )]
    polling_interval: Duration,
    #[serde(default)]
    serialize_segments: bool,
}

impl PollerConfig {
    /// The API key handed to the fetch collaborator.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    /// Whether each cycle also fetches the segments used by the fetched splits.
    pub fn serialize_segments(&self) -> bool {
        self.serialize_segments
    }
}

/// Contains methods for building a [PollerConfig] with a specified key.
///
/// If you do not change any values, the defaults are:
/// - a polling interval of [DEFAULT_POLLING_RATE_SECONDS]
/// - segments are not fetched
pub struct PollerConfigBuilder {
    key: String,
    polling_interval: Duration,
    serialize_segments: bool,
}

impl PollerConfigBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            polling_interval: default_polling_interval(),
            serialize_segments: false,
        }
    }

    /// Sets the polling interval in whole seconds. Values of zero or less select the default.
    pub fn polling_rate_seconds(&mut self, seconds: i64) -> &mut Self {
        self.polling_interval = polling_interval_from_seconds(seconds);
        self
    }

    /// Sets the polling interval directly, allowing sub-second rates. A zero duration selects the
    /// default.
    pub fn polling_interval(&mut self, interval: Duration) -> &mut Self {
        self.polling_interval = if interval.is_zero() {
            default_polling_interval()
        } else {
            interval
        };
        self
    }

    pub fn serialize_segments(&mut self, serialize_segments: bool) -> &mut Self {
        self.serialize_segments = serialize_segments;
        self
    }

    pub fn build(&self) -> PollerConfig {
        PollerConfig {
            key: self.key.clone(),
            polling_interval: self.polling_interval,
            serialize_segments: self.serialize_segments,
        }
    }
}

fn default_polling_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLLING_RATE_SECONDS as u64)
}

pub(crate) fn polling_interval_from_seconds(seconds: i64) -> Duration {
    if seconds <= 0 {
        default_polling_interval()
    } else {
        Duration::from_secs(seconds as u64)
    }
}

fn deserialize_polling_rate<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = Option::<i64>::deserialize(deserializer)?;
    Ok(polling_interval_from_seconds(seconds.unwrap_or_default()))
}
