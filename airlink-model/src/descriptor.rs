use std::fmt;

use crate::error::{ModelError, Result};

/// Security protocol of a target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SecurityKind {
    Open,
    Wep,
    Wpa,
}

impl SecurityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityKind::Open => "open",
            SecurityKind::Wep => "wep",
            SecurityKind::Wpa => "wpa",
        }
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network credential. The secret is never printed through `Debug` or
/// `Display`; callers that hand it to a platform broker go through
/// [`Credential::expose`].
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Credential(secret.into())
    }

    /// Access the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Identifying and credential information for a target network.
///
/// Immutable once constructed; the constructor rejects descriptors whose
/// credential does not match the declared security kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkDescriptor {
    ssid: String,
    credential: Option<Credential>,
    security: SecurityKind,
}

impl NetworkDescriptor {
    pub fn new(
        ssid: impl Into<String>,
        credential: Option<Credential>,
        security: SecurityKind,
    ) -> Result<Self> {
        let ssid = ssid.into();
        if ssid.is_empty() {
            return Err(ModelError::EmptySsid);
        }
        match (security, credential.is_some()) {
            (SecurityKind::Open, true)
            | (SecurityKind::Wep, false)
            | (SecurityKind::Wpa, false) => {
                return Err(ModelError::CredentialMismatch {
                    security: security.as_str(),
                    has_credential: credential.is_some(),
                });
            }
            _ => {}
        }
        Ok(NetworkDescriptor {
            ssid,
            credential,
            security,
        })
    }

    /// Convenience constructor for an open (credential-less) network.
    pub fn open(ssid: impl Into<String>) -> Result<Self> {
        Self::new(ssid, None, SecurityKind::Open)
    }

    /// Convenience constructor for a WPA passphrase network.
    pub fn wpa(ssid: impl Into<String>, passphrase: impl Into<String>) -> Result<Self> {
        Self::new(
            ssid,
            Some(Credential::new(passphrase)),
            SecurityKind::Wpa,
        )
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn security(&self) -> SecurityKind {
        self.security
    }
}
