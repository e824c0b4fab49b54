use std::fmt;

/// One access point surfaced by a platform scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanRecord {
    pub bssid: String,
    pub ssid: String,
}

impl ScanRecord {
    pub fn new(bssid: impl Into<String>, ssid: impl Into<String>) -> Self {
        ScanRecord {
            bssid: bssid.into(),
            ssid: ssid.into(),
        }
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.ssid, self.bssid)
    }
}

/// Identifier of a saved network configuration (legacy attach path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigId(pub i32);

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config-{}", self.0)
    }
}

/// One saved network configuration as listed by the platform store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedNetwork {
    pub id: ConfigId,
    pub ssid: String,
}
