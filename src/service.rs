//! Closed set of supported background removal services

use crate::error::BgRemovalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a third-party background removal provider
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    /// remove.bg
    #[default]
    RemoveBg,
    /// PhotoRoom segmentation API
    PhotoRoom,
    /// WithoutBG
    WithoutBg,
    /// Pixian.AI
    Pixian,
    /// RemovebgAPI
    RemoveBgApi,
}

impl ServiceId {
    /// Number of supported services
    pub const COUNT: usize = 5;

    /// Every service, in catalogue order
    pub const ALL: [ServiceId; Self::COUNT] = [
        Self::RemoveBg,
        Self::PhotoRoom,
        Self::WithoutBg,
        Self::Pixian,
        Self::RemoveBgApi,
    ];

    /// Stable lowercase identifier used in configuration and on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveBg => "removebg",
            Self::PhotoRoom => "photoroom",
            Self::WithoutBg => "withoutbg",
            Self::Pixian => "pixian",
            Self::RemoveBgApi => "removebgapi",
        }
    }

    /// Environment variable holding this service's credential
    #[must_use]
    pub fn credential_env(self) -> &'static str {
        match self {
            Self::RemoveBg => "REMOVEBG_API_KEY",
            Self::PhotoRoom => "PHOTOROOM_API_KEY",
            Self::WithoutBg => "WITHOUTBG_API_KEY",
            Self::Pixian => "PIXIAN_API_KEY",
            Self::RemoveBgApi => "REMOVEBGAPI_KEY",
        }
    }

    /// Position in [`ServiceId::ALL`]; indexes the per-service tables
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = BgRemovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BgRemovalError::unsupported_service(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_all_ids() {
        for id in ServiceId::ALL {
            assert_eq!(id.as_str().parse::<ServiceId>().unwrap(), id);
        }
    }

    #[test]
    fn test_default_is_removebg() {
        assert_eq!(ServiceId::default(), ServiceId::RemoveBg);
        assert_eq!(ServiceId::default().index(), 0);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(" PhotoRoom ".parse::<ServiceId>().unwrap(), ServiceId::PhotoRoom);
        assert_eq!("REMOVEBGAPI".parse::<ServiceId>().unwrap(), ServiceId::RemoveBgApi);
    }

    #[test]
    fn test_unknown_id_fails_explicitly() {
        let err = "clipdrop".parse::<ServiceId>().unwrap_err();
        assert!(matches!(err, BgRemovalError::UnsupportedService(ref id) if id == "clipdrop"));

        assert!("".parse::<ServiceId>().is_err());
    }

    #[test]
    fn test_index_matches_catalogue_order() {
        for (position, id) in ServiceId::ALL.iter().enumerate() {
            assert_eq!(id.index(), position);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&ServiceId::WithoutBg).unwrap();
        assert_eq!(json, "\"withoutbg\"");
        let parsed: ServiceId = serde_json::from_str("\"pixian\"").unwrap();
        assert_eq!(parsed, ServiceId::Pixian);
        assert!(serde_json::from_str::<ServiceId>("\"nope\"").is_err());
    }
}
