//! # Mimic
//!
//! Browser-accurate TLS ClientHello and HTTP/2 connection fingerprints.
//!
//! Compiles JA3 descriptors into ordered ClientHello specifications and
//! exposes a registry of named browser profiles, each pairing a ClientHello
//! with the HTTP/2 SETTINGS, WINDOW_UPDATE, PRIORITY and pseudo-header order
//! the same browser sends. The TLS and HTTP/2 engines that put these on the
//! wire live elsewhere.
//!
//! ```rust,ignore
//! use mimic::{FingerprintCompiler, NegotiableParams, ProfileRegistry};
//!
//! let spec = FingerprintCompiler::default()
//!     .compile("771,4865-4866,0-23-65281,29-23-24,0", &NegotiableParams::new())?;
//!
//! let chrome = ProfileRegistry::global().resolve("chrome_120")?;
//! println!("{}", chrome.http2().akamai_fingerprint());
//! ```

pub mod config;
pub mod cookie;
pub mod error;
pub mod fingerprint;

pub use config::{CustomProfileConfig, FingerprintConfig};
pub use cookie::{Cookie, CookieJar, CookieJarOptions};
pub use error::{Error, Result};
pub use fingerprint::{
    BrowserProfile, ClientHelloIdentity, ClientHelloSpec, Extension, ExtensionCatalogue,
    FingerprintCompiler, Http2Fingerprint, IdentityResolver, Ja3Fingerprint, Ja3Tokens,
    NamedIdentity, NegotiableParams, ParameterTables, ProfileRegistry,
};
