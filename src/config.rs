//! Fingerprint configuration: default profile selection and custom profiles
//! defined by a JA3 string plus HTTP/2 parameters.
//!
//! ```json
//! {
//!   "defaultProfile": "my_client",
//!   "customProfiles": {
//!     "my_client": {
//!       "ja3String": "771,4865-4866,0-23-65281,29-23-24,0",
//!       "h2Settings": { "HEADER_TABLE_SIZE": 65536, "INITIAL_WINDOW_SIZE": 6291456 },
//!       "h2SettingsOrder": ["HEADER_TABLE_SIZE", "INITIAL_WINDOW_SIZE"],
//!       "pseudoHeaderOrder": [":method", ":authority", ":scheme", ":path"],
//!       "connectionFlow": 15663105
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint::http2::{
    Http2Fingerprint, Priority, PriorityParam, PseudoHeader, SettingId, CHROME_PSEUDO_HEADER_ORDER,
};
use crate::fingerprint::params::NegotiableParams;
use crate::fingerprint::profiles::{BrowserProfile, ClientHelloIdentity, ProfileRegistry, DEFAULT_PROFILE};
use crate::fingerprint::FingerprintCompiler;

/// Connection window used when a custom profile does not set one.
pub const DEFAULT_CONNECTION_FLOW: u32 = 15663105;

/// Client identity recorded on compiled custom profiles.
pub const CUSTOM_CLIENT: &str = "Custom";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FingerprintConfig {
    /// Profile used when a caller names none. Falls back to `chrome_120`.
    pub default_profile: Option<String>,
    pub custom_profiles: BTreeMap<String, CustomProfileConfig>,
}

impl FingerprintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(
            "Loaded fingerprint config from {}: {} custom profiles",
            path.display(),
            config.custom_profiles.len()
        );
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    pub fn default_profile(mut self, name: impl Into<String>) -> Self {
        self.default_profile = Some(name.into());
        self
    }

    pub fn custom_profile(mut self, name: impl Into<String>, profile: CustomProfileConfig) -> Self {
        self.custom_profiles.insert(name.into(), profile);
        self
    }

    /// Name of the configured default profile.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }
}

/// A profile defined by a JA3 string and its negotiable side-channel lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomProfileConfig {
    pub ja3_string: String,
    /// Setting name (e.g. `HEADER_TABLE_SIZE`) to value.
    pub h2_settings: BTreeMap<String, u32>,
    /// Send order. When empty, settings go out in ascending identifier order.
    pub h2_settings_order: Vec<String>,
    /// Pseudo-header names such as `:method`. Defaults to the Chrome order.
    pub pseudo_header_order: Vec<String>,
    pub connection_flow: Option<u32>,
    pub priority_frames: Vec<Priority>,
    pub header_priority: Option<PriorityParam>,
    pub cert_compression_algo: Option<String>,
    pub supported_signature_algorithms: Vec<String>,
    pub supported_versions: Vec<String>,
    pub key_share_curves: Vec<String>,
}

impl CustomProfileConfig {
    pub fn new(ja3_string: impl Into<String>) -> Self {
        Self {
            ja3_string: ja3_string.into(),
            ..Self::default()
        }
    }

    pub fn h2_setting(mut self, id: SettingId, value: u32) -> Self {
        self.h2_settings.insert(id.name().to_string(), value);
        self.h2_settings_order.push(id.name().to_string());
        self
    }

    pub fn pseudo_header_order(mut self, order: &[PseudoHeader]) -> Self {
        self.pseudo_header_order = order.iter().map(|h| h.as_str().to_string()).collect();
        self
    }

    pub fn connection_flow(mut self, flow: u32) -> Self {
        self.connection_flow = Some(flow);
        self
    }

    pub fn negotiable(mut self, params: NegotiableParams) -> Self {
        self.supported_signature_algorithms = params.signature_algorithms;
        self.supported_versions = params.supported_versions;
        self.key_share_curves = params.key_share_curves;
        self.cert_compression_algo = params.cert_compression;
        self
    }

    /// Side-channel lists handed to the compiler.
    pub fn negotiable_params(&self) -> NegotiableParams {
        NegotiableParams {
            signature_algorithms: self.supported_signature_algorithms.clone(),
            supported_versions: self.supported_versions.clone(),
            key_share_curves: self.key_share_curves.clone(),
            cert_compression: self.cert_compression_algo.clone(),
        }
    }

    /// HTTP/2 parameters, validated.
    pub fn http2(&self) -> Result<Http2Fingerprint> {
        let settings = self
            .h2_settings
            .iter()
            .map(|(name, value)| Ok((name.parse::<SettingId>()?, *value)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let order = if self.h2_settings_order.is_empty() {
            settings.keys().copied().collect::<Vec<_>>()
        } else {
            self.h2_settings_order
                .iter()
                .map(|name| name.parse::<SettingId>())
                .collect::<Result<Vec<_>>>()?
        };

        let pseudo = if self.pseudo_header_order.is_empty() {
            CHROME_PSEUDO_HEADER_ORDER.to_vec()
        } else {
            self.pseudo_header_order
                .iter()
                .map(|name| name.parse::<PseudoHeader>())
                .collect::<Result<Vec<_>>>()?
        };

        let mut fingerprint = Http2Fingerprint::new(
            &[],
            &pseudo,
            self.connection_flow.unwrap_or(DEFAULT_CONNECTION_FLOW),
        )
        .with_priorities(&self.priority_frames);
        fingerprint.settings = settings.into_iter().collect();
        fingerprint.settings_order = order;
        fingerprint.header_priority = self.header_priority;

        fingerprint.validate()?;
        Ok(fingerprint)
    }

    /// Compile into a profile with a pinned ClientHello.
    pub fn compile(&self, name: &str, compiler: &FingerprintCompiler) -> Result<BrowserProfile> {
        let spec = compiler.compile(&self.ja3_string, &self.negotiable_params())?;
        let http2 = self.http2()?;
        Ok(BrowserProfile::new(
            ClientHelloIdentity::pinned(CUSTOM_CLIENT, name, spec),
            http2,
        ))
    }
}

impl ProfileRegistry {
    /// Built-in profiles plus every custom profile in `config`, compiled up
    /// front. Any failing profile fails the whole registry.
    pub fn from_config(config: &FingerprintConfig, compiler: &FingerprintCompiler) -> Result<Self> {
        let mut builder = ProfileRegistry::builder().with_builtin();
        for (name, custom) in &config.custom_profiles {
            let profile = custom.compile(name, compiler).map_err(|e| {
                tracing::warn!("Custom profile {} failed to compile: {}", name, e);
                e
            })?;
            builder = builder.profile(name.clone(), profile);
        }

        let registry = builder.default_profile(config.default_profile_name()).build()?;
        tracing::debug!(
            "Built profile registry: {} profiles, default {}",
            registry.len(),
            registry.default_name()
        );
        Ok(registry)
    }
}
