//! System event types as the single source of truth for their row strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// OS-level session and power events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEventType {
    Startup,
    Shutdown,
    Sleep,
    Wake,
    AppLaunch,
    AppClose,
    Login,
    Logout,
}

impl SystemEventType {
    /// String representation used in persisted rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Sleep => "sleep",
            Self::Wake => "wake",
            Self::AppLaunch => "app_launch",
            Self::AppClose => "app_close",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }

    /// Returns true for events that end an awake span.
    #[must_use]
    pub const fn ends_awake(&self) -> bool {
        matches!(self, Self::Sleep | Self::Shutdown)
    }
}

impl fmt::Display for SystemEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SystemEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older files stored the enum repr rather than its value.
        let s = s.strip_prefix("SystemEventType.").unwrap_or(s);
        match s.to_ascii_lowercase().as_str() {
            "startup" => Ok(Self::Startup),
            "shutdown" => Ok(Self::Shutdown),
            "sleep" => Ok(Self::Sleep),
            "wake" => Ok(Self::Wake),
            "app_launch" => Ok(Self::AppLaunch),
            "app_close" => Ok(Self::AppClose),
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

impl Serialize for SystemEventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SystemEventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown system event type strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown system event type: {0}")]
pub struct UnknownEventType(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        let variants = [
            SystemEventType::Startup,
            SystemEventType::Shutdown,
            SystemEventType::Sleep,
            SystemEventType::Wake,
            SystemEventType::AppLaunch,
            SystemEventType::AppClose,
            SystemEventType::Login,
            SystemEventType::Logout,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: SystemEventType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn legacy_enum_repr_parses() {
        let wake: SystemEventType = "SystemEventType.WAKE".parse().expect("should parse");
        assert_eq!(wake, SystemEventType::Wake);
    }

    #[test]
    fn unknown_type_errors() {
        let result: Result<SystemEventType, _> = "hibernate".parse();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown system event type: hibernate");
    }

    #[test]
    fn only_sleep_and_shutdown_end_awake() {
        assert!(SystemEventType::Sleep.ends_awake());
        assert!(SystemEventType::Shutdown.ends_awake());
        assert!(!SystemEventType::Wake.ends_awake());
        assert!(!SystemEventType::Logout.ends_awake());
    }
}
