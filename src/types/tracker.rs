//! Tracker endpoint addresses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use crate::connection_error::ConfigError;

/// A validated `host:port` tracker endpoint
///
/// Exactly one `:` is allowed, the host must be non-blank and the port must
/// be a positive `u16`.
///
/// # Examples
///
/// ```
/// use fdfs_pool::types::TrackerAddr;
///
/// let addr: TrackerAddr = "192.168.1.100:22122".parse().unwrap();
/// assert_eq!(addr.host(), "192.168.1.100");
/// assert_eq!(addr.port(), 22122);
///
/// assert!("tracker".parse::<TrackerAddr>().is_err());
/// assert!("tracker:0".parse::<TrackerAddr>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackerAddr {
    host: String,
    port: NonZeroU16,
}

impl TrackerAddr {
    /// Build from already-separated parts
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        let host = host.into();
        let entry = format!("{host}:{port}");
        if host.trim().is_empty() {
            return Err(invalid(&entry, "empty host"));
        }
        let port = NonZeroU16::new(port).ok_or_else(|| invalid(&entry, "port must be positive"))?;
        Ok(Self { host, port })
    }

    #[must_use]
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    #[inline]
    pub fn port(&self) -> u16 {
        self.port.get()
    }
}

fn invalid(entry: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidTrackerAddress {
        entry: entry.to_string(),
        reason,
    }
}

impl FromStr for TrackerAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        let mut parts = entry.split(':');
        let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid(entry, "expected exactly one host and one port"));
        };

        let host = host.trim();
        if host.is_empty() {
            return Err(invalid(entry, "empty host"));
        }

        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| invalid(entry, "port is not a number"))?;
        let port = NonZeroU16::new(port).ok_or_else(|| invalid(entry, "port must be positive"))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl TryFrom<String> for TrackerAddr {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrackerAddr> for String {
    fn from(addr: TrackerAddr) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for TrackerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse a list of tracker entries, each of which may itself be comma-joined
///
/// `["a:1,b:2", "c:3"]` yields three addresses. A single trailing comma is
/// tolerated; any other blank entry or fragment is rejected. No entries at
/// all is [`ConfigError::EmptyTrackerList`].
pub fn parse_tracker_list<I, S>(entries: I) -> Result<Vec<TrackerAddr>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut trackers = Vec::new();
    for entry in entries {
        let entry = entry.as_ref().trim_end();
        let entry = entry.strip_suffix(',').unwrap_or(entry);
        for fragment in entry.split(',') {
            if fragment.trim().is_empty() {
                return Err(invalid(fragment, "empty tracker entry"));
            }
            trackers.push(fragment.parse()?);
        }
    }

    if trackers.is_empty() {
        return Err(ConfigError::EmptyTrackerList);
    }
    Ok(trackers)
}
