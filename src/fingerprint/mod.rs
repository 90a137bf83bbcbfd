//! TLS and HTTP/2 fingerprint compilation.

pub mod catalogue;
pub mod compiler;
pub mod extension;
pub mod http2;
pub mod ja3;
pub mod params;
pub mod presets;
pub mod profiles;
pub mod tls;

pub use catalogue::ExtensionCatalogue;
pub use compiler::FingerprintCompiler;
pub use extension::{CertCompressionAlgo, Extension, KeyShare};
pub use http2::{Http2Fingerprint, PseudoHeader, Priority, PriorityParam, SettingId};
pub use ja3::{Ja3Fingerprint, Ja3Tokens};
pub use params::{NegotiableParams, ParameterTables, ResolvedParams};
pub use profiles::{
    BrowserProfile, ClientHelloIdentity, IdentityResolver, NamedIdentity, ProfileRegistry,
    ProfileRegistryBuilder,
};
pub use tls::{ClientHelloSpec, SessionIdDerivation};
