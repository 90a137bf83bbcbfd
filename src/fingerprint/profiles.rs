//! Browser fingerprint profiles.
//!
//! A profile pairs a ClientHello identity with the HTTP/2 parameters the same
//! browser sends. The registry is built once and is read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use super::http2::{
    Http2Fingerprint, Priority, PriorityParam, SettingId, CHROME_PSEUDO_HEADER_ORDER,
    FIREFOX_PSEUDO_HEADER_ORDER, SAFARI_PSEUDO_HEADER_ORDER,
};
use super::presets;
use super::tls::ClientHelloSpec;
use crate::error::{Error, Result};

/// Name of the profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "chrome_120";

/// Reference to a ClientHello that another layer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedIdentity {
    pub client: &'static str,
    pub version: &'static str,
}

impl NamedIdentity {
    pub const fn new(client: &'static str, version: &'static str) -> Self {
        Self { client, version }
    }
}

impl fmt::Display for NamedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.client, self.version)
    }
}

/// Turns named identities into specifications. Implemented by the TLS layer
/// that owns the canonical identity table.
pub trait IdentityResolver {
    fn resolve(&self, identity: &NamedIdentity) -> Option<ClientHelloSpec>;
}

/// How a profile obtains its ClientHello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientHelloIdentity {
    /// Exact specification held by the profile.
    Pinned {
        client: String,
        version: String,
        spec: ClientHelloSpec,
    },
    /// Delegated to an [`IdentityResolver`].
    Named(NamedIdentity),
}

impl ClientHelloIdentity {
    pub fn pinned(client: impl Into<String>, version: impl Into<String>, spec: ClientHelloSpec) -> Self {
        Self::Pinned {
            client: client.into(),
            version: version.into(),
            spec,
        }
    }

    pub fn client(&self) -> &str {
        match self {
            Self::Pinned { client, .. } => client,
            Self::Named(id) => id.client,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Self::Pinned { version, .. } => version,
            Self::Named(id) => id.version,
        }
    }
}

/// Browser fingerprint profile for impersonation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    identity: ClientHelloIdentity,
    http2: Http2Fingerprint,
}

impl BrowserProfile {
    pub fn new(identity: ClientHelloIdentity, http2: Http2Fingerprint) -> Self {
        Self { identity, http2 }
    }

    pub fn identity(&self) -> &ClientHelloIdentity {
        &self.identity
    }

    pub fn http2(&self) -> &Http2Fingerprint {
        &self.http2
    }

    /// The pinned specification. Named identities need a resolver; see
    /// [`client_hello_spec_with`](Self::client_hello_spec_with).
    pub fn client_hello_spec(&self) -> Result<ClientHelloSpec> {
        match &self.identity {
            ClientHelloIdentity::Pinned { spec, .. } => Ok(spec.clone()),
            ClientHelloIdentity::Named(id) => Err(Error::UnresolvedIdentity(id.to_string())),
        }
    }

    pub fn client_hello_spec_with<R>(&self, resolver: &R) -> Result<ClientHelloSpec>
    where
        R: IdentityResolver + ?Sized,
    {
        match &self.identity {
            ClientHelloIdentity::Pinned { spec, .. } => Ok(spec.clone()),
            ClientHelloIdentity::Named(id) => resolver
                .resolve(id)
                .ok_or_else(|| Error::UnresolvedIdentity(id.to_string())),
        }
    }
}

/// Chromium-family HTTP/2 settings that include MAX_CONCURRENT_STREAMS.
pub fn chrome_profile(identity: ClientHelloIdentity) -> BrowserProfile {
    BrowserProfile::new(
        identity,
        Http2Fingerprint::new(
            &[
                (SettingId::HeaderTableSize, 65536),
                (SettingId::EnablePush, 0),
                (SettingId::MaxConcurrentStreams, 1000),
                (SettingId::InitialWindowSize, 6291456),
                (SettingId::MaxHeaderListSize, 262144),
            ],
            &CHROME_PSEUDO_HEADER_ORDER,
            CHROME_CONNECTION_FLOW,
        ),
    )
}

/// Chromium-family HTTP/2 settings without MAX_CONCURRENT_STREAMS (Chrome 117+).
pub fn chrome_profile_non_streams(identity: ClientHelloIdentity) -> BrowserProfile {
    BrowserProfile::new(
        identity,
        Http2Fingerprint::new(
            &[
                (SettingId::HeaderTableSize, 65536),
                (SettingId::EnablePush, 0),
                (SettingId::InitialWindowSize, 6291456),
                (SettingId::MaxHeaderListSize, 262144),
            ],
            &CHROME_PSEUDO_HEADER_ORDER,
            CHROME_CONNECTION_FLOW,
        ),
    )
}

const CHROME_CONNECTION_FLOW: u32 = 15663105;
const FIREFOX_CONNECTION_FLOW: u32 = 12517377;
const SAFARI_CONNECTION_FLOW: u32 = 10485760;
const OKHTTP_CONNECTION_FLOW: u32 = 16711681;

/// Firefox's idle/leader stream tree.
const FIREFOX_PRIORITIES: &[Priority] = &[
    Priority::new(3, 0, false, 200),
    Priority::new(5, 0, false, 100),
    Priority::new(7, 0, false, 0),
    Priority::new(9, 7, false, 0),
    Priority::new(11, 3, false, 0),
    Priority::new(13, 0, false, 240),
];

const FIREFOX_HEADER_PRIORITY: PriorityParam = PriorityParam::new(13, false, 41);

fn opera_profile(identity: ClientHelloIdentity) -> BrowserProfile {
    BrowserProfile::new(
        identity,
        Http2Fingerprint::new(
            &[
                (SettingId::HeaderTableSize, 65536),
                (SettingId::MaxConcurrentStreams, 1000),
                (SettingId::InitialWindowSize, 6291456),
                (SettingId::MaxHeaderListSize, 262144),
            ],
            &CHROME_PSEUDO_HEADER_ORDER,
            CHROME_CONNECTION_FLOW,
        ),
    )
}

fn firefox_http2() -> Http2Fingerprint {
    Http2Fingerprint::new(
        &[
            (SettingId::HeaderTableSize, 65536),
            (SettingId::InitialWindowSize, 131072),
            (SettingId::MaxFrameSize, 16384),
        ],
        &FIREFOX_PSEUDO_HEADER_ORDER,
        FIREFOX_CONNECTION_FLOW,
    )
    .with_priorities(FIREFOX_PRIORITIES)
}

/// Firefox up to 106 sent the PRIORITY tree but no HEADERS priority.
fn firefox_profile_legacy(identity: ClientHelloIdentity) -> BrowserProfile {
    BrowserProfile::new(identity, firefox_http2())
}

fn firefox_profile(identity: ClientHelloIdentity) -> BrowserProfile {
    BrowserProfile::new(identity, firefox_http2().with_header_priority(FIREFOX_HEADER_PRIORITY))
}

fn safari_profile(identity: ClientHelloIdentity, initial_window_size: u32) -> BrowserProfile {
    BrowserProfile::new(
        identity,
        Http2Fingerprint::new(
            &[
                (SettingId::InitialWindowSize, initial_window_size),
                (SettingId::MaxConcurrentStreams, 100),
            ],
            &SAFARI_PSEUDO_HEADER_ORDER,
            SAFARI_CONNECTION_FLOW,
        ),
    )
}

fn okhttp_profile(client: &str) -> BrowserProfile {
    BrowserProfile::new(
        ClientHelloIdentity::pinned(client, "1", presets::okhttp_android()),
        Http2Fingerprint::new(
            &[(SettingId::InitialWindowSize, 16777216)],
            &FIREFOX_PSEUDO_HEADER_ORDER,
            OKHTTP_CONNECTION_FLOW,
        ),
    )
}

fn named(client: &'static str, version: &'static str) -> ClientHelloIdentity {
    ClientHelloIdentity::Named(NamedIdentity::new(client, version))
}

/// Every built-in profile, keyed by name.
pub fn builtin_profiles() -> Vec<(&'static str, BrowserProfile)> {
    let mut profiles = vec![
        ("chrome_100", chrome_profile(named("Chrome", "100"))),
        ("chrome_102", chrome_profile(named("Chrome", "102"))),
        ("chrome_103", chrome_profile(named("Chrome", "103"))),
        ("chrome_104", chrome_profile(named("Chrome", "104"))),
        ("chrome_105", chrome_profile(named("Chrome", "105"))),
        ("chrome_106", chrome_profile(named("Chrome", "106"))),
        ("chrome_107", chrome_profile(named("Chrome", "107"))),
        ("chrome_108", chrome_profile(named("Chrome", "108"))),
        ("chrome_109", chrome_profile(named("Chrome", "109"))),
        ("chrome_110", chrome_profile(named("Chrome", "110"))),
        ("chrome_111", chrome_profile(named("Chrome", "111"))),
        ("chrome_112", chrome_profile(named("Chrome", "112"))),
        (
            "chrome_117",
            chrome_profile_non_streams(ClientHelloIdentity::pinned("Chrome", "117", presets::chrome_117())),
        ),
        (
            "chrome_120",
            chrome_profile_non_streams(ClientHelloIdentity::pinned("Chrome", "120", presets::chrome_120())),
        ),
        ("chrome_112_psk", chrome_profile(named("Chrome", "112_PSK"))),
        ("chrome_114_psk", chrome_profile(named("Chrome", "114_Padding_PSK"))),
        ("chrome_115_pq", chrome_profile(named("Chrome", "115_PQ"))),
        ("chrome_115_psk", chrome_profile(named("Chrome", "115_PQ_PSK"))),
        (
            "chrome_117_psk",
            chrome_profile_non_streams(ClientHelloIdentity::pinned(
                "Chrome",
                "117_PSK",
                presets::chrome_117_psk(),
            )),
        ),
        (
            "chrome_120_psk",
            chrome_profile_non_streams(ClientHelloIdentity::pinned(
                "Chrome",
                "120_PSK",
                presets::chrome_120_psk(),
            )),
        ),
        ("safari_15_6_1", safari_profile(named("Safari", "15.6.1"), 4194304)),
        ("safari_16_0", safari_profile(named("Safari", "16.0"), 4194304)),
        ("safari_ipad_15_6", safari_profile(named("iPad", "15.6"), 2097152)),
        ("safari_ios_15_5", safari_profile(named("iOS", "15.5"), 2097152)),
        ("safari_ios_15_6", safari_profile(named("iOS", "15.6"), 2097152)),
        ("safari_ios_16_0", safari_profile(named("iOS", "16.0"), 2097152)),
        ("firefox_102", firefox_profile_legacy(named("Firefox", "102"))),
        ("firefox_104", firefox_profile_legacy(named("Firefox", "104"))),
        ("firefox_105", firefox_profile_legacy(named("Firefox", "105"))),
        ("firefox_106", firefox_profile_legacy(named("Firefox", "106"))),
        ("firefox_108", firefox_profile(named("Firefox", "108"))),
        ("firefox_110", firefox_profile(named("Firefox", "110"))),
        (
            "firefox_117",
            firefox_profile(ClientHelloIdentity::pinned("Firefox", "117", presets::firefox_117())),
        ),
        (
            "firefox_120",
            firefox_profile(ClientHelloIdentity::pinned("Firefox", "120", presets::firefox_120())),
        ),
        (
            "firefox_123",
            firefox_profile(ClientHelloIdentity::pinned("Firefox", "123", presets::firefox_123())),
        ),
        ("opera_89", opera_profile(named("Opera", "89"))),
        ("opera_90", opera_profile(named("Opera", "90"))),
        ("opera_91", opera_profile(named("Opera", "91"))),
        ("zalando_android_mobile", okhttp_profile("ZalandoAndroidCustom")),
        ("nike_android_mobile", okhttp_profile("NikeAndroidCustom")),
        (
            "zalando_ios_mobile",
            safari_profile(
                ClientHelloIdentity::pinned("ZalandoIosCustom", "1", presets::cfnetwork_ios()),
                2097152,
            ),
        ),
        (
            "nike_ios_mobile",
            safari_profile(
                ClientHelloIdentity::pinned("NikeIosCustom", "1", presets::cfnetwork_ios()),
                2097152,
            ),
        ),
        (
            "cloudflare_custom",
            chrome_profile(ClientHelloIdentity::pinned(
                "CloudflareCustom",
                "1",
                presets::cloudflare_custom(),
            )),
        ),
    ];

    // iOS 17 still sends the iOS 16 hello but started disabling push.
    let mut ios_17 = safari_profile(named("iOS", "16.0"), 2097152);
    ios_17.http2 = Http2Fingerprint::new(
        &[
            (SettingId::EnablePush, 0),
            (SettingId::InitialWindowSize, 2097152),
            (SettingId::MaxConcurrentStreams, 100),
        ],
        &SAFARI_PSEUDO_HEADER_ORDER,
        SAFARI_CONNECTION_FLOW,
    );
    profiles.push(("safari_ios_17_0", ios_17));

    profiles
}

/// Immutable name → profile catalogue with a configured default.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, BrowserProfile>,
    default_name: String,
    default_profile: BrowserProfile,
}

impl ProfileRegistry {
    /// Registry of built-in profiles with `chrome_120` as default.
    pub fn builtin() -> Self {
        let profiles: BTreeMap<String, BrowserProfile> = builtin_profiles()
            .into_iter()
            .map(|(name, profile)| (name.to_string(), profile))
            .collect();
        let default_profile = profiles
            .get(DEFAULT_PROFILE)
            .cloned()
            .unwrap_or_else(|| chrome_profile_non_streams(ClientHelloIdentity::pinned("Chrome", "120", presets::chrome_120())));

        Self {
            profiles,
            default_name: DEFAULT_PROFILE.to_string(),
            default_profile,
        }
    }

    /// Process-wide built-in registry, constructed on first use.
    pub fn global() -> &'static ProfileRegistry {
        static REGISTRY: OnceLock<ProfileRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ProfileRegistry::builtin)
    }

    pub fn builder() -> ProfileRegistryBuilder {
        ProfileRegistryBuilder::default()
    }

    pub fn resolve(&self, name: &str) -> Result<&BrowserProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Resolve `name`, or the default profile when no name is given or it is unknown.
    pub fn resolve_or_default(&self, name: Option<&str>) -> &BrowserProfile {
        match name.map(|n| self.resolve(n)) {
            Some(Ok(profile)) => profile,
            Some(Err(e)) => {
                tracing::warn!("{}, falling back to {}", e, self.default_name);
                &self.default_profile
            }
            None => &self.default_profile,
        }
    }

    pub fn default_profile(&self) -> &BrowserProfile {
        &self.default_profile
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Assembles a [`ProfileRegistry`]. All mutation happens here, before the
/// registry is shared.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistryBuilder {
    profiles: BTreeMap<String, BrowserProfile>,
    default_name: Option<String>,
}

impl ProfileRegistryBuilder {
    /// Start from the built-in catalogue.
    pub fn with_builtin(mut self) -> Self {
        for (name, profile) in builtin_profiles() {
            self.profiles.insert(name.to_string(), profile);
        }
        self
    }

    /// Add or replace a profile.
    pub fn profile(mut self, name: impl Into<String>, profile: BrowserProfile) -> Self {
        self.profiles.insert(name.into(), profile);
        self
    }

    pub fn default_profile(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    /// Validate every HTTP/2 parameter set and the default name.
    pub fn build(self) -> Result<ProfileRegistry> {
        for (name, profile) in &self.profiles {
            profile
                .http2
                .validate()
                .map_err(|e| Error::http2_settings(format!("profile {}: {}", name, e)))?;
        }

        let default_name = self.default_name.unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let default_profile = self
            .profiles
            .get(&default_name)
            .cloned()
            .ok_or_else(|| Error::ProfileNotFound(default_name.clone()))?;

        Ok(ProfileRegistry {
            profiles: self.profiles,
            default_name,
            default_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_chrome_120() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.default_name(), "chrome_120");
        assert_eq!(registry.default_profile().identity().version(), "120");
    }

    #[test]
    fn test_helpers_differ_only_in_streams() {
        let streams = chrome_profile(named("Chrome", "1"));
        let no_streams = chrome_profile_non_streams(named("Chrome", "1"));
        assert_eq!(
            streams.http2().settings.get(&SettingId::MaxConcurrentStreams),
            Some(&1000)
        );
        assert!(!no_streams.http2().settings.contains_key(&SettingId::MaxConcurrentStreams));
        assert_eq!(streams.http2().pseudo_header_order, no_streams.http2().pseudo_header_order);
        assert_eq!(streams.http2().connection_flow, no_streams.http2().connection_flow);
    }

    #[test]
    fn test_named_identity_display() {
        assert_eq!(NamedIdentity::new("Chrome", "112").to_string(), "Chrome-112");
    }
}
