//! Profile registry tests.

use std::collections::HashSet;

use mimic::fingerprint::http2::SettingId;
use mimic::fingerprint::profiles::{chrome_profile, chrome_profile_non_streams, DEFAULT_PROFILE};
use mimic::fingerprint::presets;
use mimic::{
    BrowserProfile, ClientHelloIdentity, ClientHelloSpec, Error, FingerprintCompiler,
    IdentityResolver, Ja3Fingerprint, NamedIdentity, NegotiableParams, ProfileRegistry,
};

const ADVERTISED: &[&str] = &[
    "chrome_100", "chrome_102", "chrome_103", "chrome_104", "chrome_105", "chrome_106",
    "chrome_107", "chrome_108", "chrome_109", "chrome_110", "chrome_111", "chrome_112",
    "chrome_117", "chrome_120", "chrome_112_psk", "chrome_114_psk", "chrome_115_pq",
    "chrome_115_psk", "chrome_117_psk", "chrome_120_psk", "safari_15_6_1", "safari_16_0",
    "safari_ipad_15_6", "safari_ios_15_5", "safari_ios_15_6", "safari_ios_16_0",
    "safari_ios_17_0", "firefox_102", "firefox_104", "firefox_105", "firefox_106",
    "firefox_108", "firefox_110", "firefox_117", "firefox_120", "firefox_123", "opera_89",
    "opera_90", "opera_91", "zalando_android_mobile", "zalando_ios_mobile",
    "nike_ios_mobile", "nike_android_mobile", "cloudflare_custom",
];

/// Resolver that answers every named identity with one Chrome JA3.
struct Ja3Resolver;

impl IdentityResolver for Ja3Resolver {
    fn resolve(&self, identity: &NamedIdentity) -> Option<ClientHelloSpec> {
        if identity.client != "Chrome" {
            return None;
        }
        FingerprintCompiler::default()
            .compile(
                "771,4865-4866-4867,0-23-65281-10-11,29-23-24,0",
                &NegotiableParams::new(),
            )
            .ok()
    }
}

#[test]
fn test_lookup_is_total_over_advertised_names() {
    let registry = ProfileRegistry::global();
    assert_eq!(registry.len(), ADVERTISED.len());

    for name in ADVERTISED {
        let profile = registry.resolve(name).unwrap_or_else(|e| panic!("{}: {}", name, e));
        let http2 = profile.http2();
        assert!(!http2.settings_order.is_empty(), "{} has empty settings order", name);

        let order: HashSet<_> = http2.settings_order.iter().copied().collect();
        let keys: HashSet<_> = http2.settings.keys().copied().collect();
        assert_eq!(order, keys, "{} order/keys mismatch", name);
        assert_eq!(order.len(), http2.settings_order.len(), "{} duplicate order entry", name);
        assert_eq!(http2.pseudo_header_order.len(), 4, "{}", name);
        http2.validate().unwrap();
    }
}

#[test]
fn test_unknown_profile() {
    let registry = ProfileRegistry::global();
    assert!(matches!(
        registry.resolve("netscape_4"),
        Err(Error::ProfileNotFound(ref n)) if n == "netscape_4"
    ));
    let fallback = registry.resolve_or_default(Some("netscape_4"));
    assert_eq!(fallback, registry.resolve(DEFAULT_PROFILE).unwrap());
    assert_eq!(registry.resolve_or_default(None), registry.default_profile());
}

#[test]
fn test_global_is_shared() {
    let a = ProfileRegistry::global() as *const ProfileRegistry;
    let b = ProfileRegistry::global() as *const ProfileRegistry;
    assert_eq!(a, b);
}

#[test]
fn test_pinned_profiles_produce_specs() {
    let registry = ProfileRegistry::global();
    for name in ["chrome_117", "chrome_120", "chrome_120_psk", "firefox_123", "nike_ios_mobile"] {
        let spec = registry.resolve(name).unwrap().client_hello_spec().unwrap();
        assert!(!spec.cipher_suites.is_empty(), "{}", name);
        assert!(!spec.extensions.is_empty(), "{}", name);
    }

    let chrome = registry.resolve("chrome_120").unwrap();
    assert_eq!(chrome.client_hello_spec().unwrap(), presets::chrome_120());
    assert_eq!(chrome.identity().client(), "Chrome");
}

#[test]
fn test_named_profiles_need_resolver() {
    let registry = ProfileRegistry::global();
    let chrome_110 = registry.resolve("chrome_110").unwrap();
    assert!(matches!(
        chrome_110.client_hello_spec(),
        Err(Error::UnresolvedIdentity(ref id)) if id == "Chrome-110"
    ));

    let spec = chrome_110.client_hello_spec_with(&Ja3Resolver).unwrap();
    assert_eq!(spec.extension_ids(), vec![0, 23, 65281, 10, 11]);

    let safari = registry.resolve("safari_16_0").unwrap();
    assert!(safari.client_hello_spec_with(&Ja3Resolver).is_err());

    // Pinned profiles ignore the resolver.
    let firefox = registry.resolve("firefox_120").unwrap();
    assert_eq!(
        firefox.client_hello_spec_with(&Ja3Resolver).unwrap(),
        presets::firefox_120()
    );
}

#[test]
fn test_ios_17_reuses_ios_16_hello() {
    let registry = ProfileRegistry::global();
    let ios_17 = registry.resolve("safari_ios_17_0").unwrap();
    let ios_16 = registry.resolve("safari_ios_16_0").unwrap();
    assert_eq!(ios_17.identity(), ios_16.identity());
    assert_eq!(ios_17.http2().settings_order[0], SettingId::EnablePush);
}

#[test]
fn test_chrome_http2_generations() {
    let registry = ProfileRegistry::global();
    let old = registry.resolve("chrome_110").unwrap().http2();
    let new = registry.resolve("chrome_120").unwrap().http2();
    assert_eq!(old.settings.get(&SettingId::MaxConcurrentStreams), Some(&1000));
    assert!(!new.settings.contains_key(&SettingId::MaxConcurrentStreams));
    assert_eq!(
        new.akamai_fingerprint(),
        "1:65536;2:0;4:6291456;6:262144|15663105|0|m,a,s,p"
    );
}

#[test]
fn test_firefox_priority_tree() {
    let registry = ProfileRegistry::global();
    let legacy = registry.resolve("firefox_102").unwrap().http2();
    let current = registry.resolve("firefox_123").unwrap().http2();
    assert_eq!(legacy.priorities.len(), 6);
    assert_eq!(legacy.header_priority, None);
    assert_eq!(current.header_priority.map(|p| p.stream_dep), Some(13));
    assert_eq!(
        current.akamai_fingerprint(),
        "1:65536;4:131072;5:16384|12517377|3:0:0:201,5:0:0:101,7:0:0:1,9:0:7:1,11:0:3:1,13:0:0:241|m,p,a,s"
    );
}

#[test]
fn test_firefox_ja3_has_no_grease() {
    let ja3 = Ja3Fingerprint::from_spec(&presets::firefox_120());
    let chrome = Ja3Fingerprint::from_spec(&presets::chrome_120());
    assert!(!ja3.raw_string.contains("2570"));
    assert!(!chrome.raw_string.contains("2570"));
    assert_ne!(ja3.hash, chrome.hash);
}

#[test]
fn test_builder_validates() {
    let identity = ClientHelloIdentity::Named(NamedIdentity::new("Chrome", "1"));

    let registry = ProfileRegistry::builder()
        .profile("a", chrome_profile(identity.clone()))
        .profile("b", chrome_profile_non_streams(identity.clone()))
        .default_profile("b")
        .build()
        .unwrap();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(registry.default_name(), "b");

    let err = ProfileRegistry::builder()
        .profile("a", chrome_profile(identity.clone()))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(ref n) if n == DEFAULT_PROFILE));

    let mut broken = chrome_profile(identity);
    let mut http2 = broken.http2().clone();
    http2.settings_order.pop();
    broken = BrowserProfile::new(broken.identity().clone(), http2);
    let err = ProfileRegistry::builder()
        .with_builtin()
        .profile("broken", broken)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHttp2Settings(_)));
}
