//! Extension catalogue: default descriptors for every extension a JA3
//! string may reference that needs no caller-supplied parameters.

use std::collections::HashMap;

use super::extension::{
    ids, Extension, PaddingStyle, Renegotiation, GREASE_PLACEHOLDER, PSK_MODE_DHE,
};

/// Map from extension id to the descriptor the assembler emits for it.
///
/// The negotiable kinds (curves, point formats, signature algorithms, key
/// share, supported versions, certificate compression) are absent until the
/// assembler fills them from resolved parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionCatalogue {
    entries: HashMap<u16, Extension>,
}

impl ExtensionCatalogue {
    /// Empty catalogue, for tests that want full control over known ids.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalogue of parameterless defaults.
    pub fn builtin() -> Self {
        let entries = [
            (GREASE_PLACEHOLDER, Extension::Grease),
            (ids::SERVER_NAME, Extension::ServerName),
            (ids::STATUS_REQUEST, Extension::StatusRequest),
            (ids::ALPN, Extension::alpn_h2_http11()),
            (ids::SCT, Extension::Sct),
            (ids::PADDING, Extension::Padding(PaddingStyle::Boring)),
            (ids::EXTENDED_MASTER_SECRET, Extension::ExtendedMasterSecret),
            // Zero leaves the limit to the TLS engine. Firefox's value lives in its presets.
            (ids::RECORD_SIZE_LIMIT, Extension::RecordSizeLimit(0)),
            (ids::DELEGATED_CREDENTIALS, Extension::DelegatedCredentials(Vec::new())),
            (ids::SESSION_TICKET, Extension::SessionTicket),
            (ids::PRE_SHARED_KEY, Extension::PreSharedKey),
            (
                ids::EARLY_DATA,
                Extension::Generic {
                    id: ids::EARLY_DATA,
                    data: Vec::new(),
                },
            ),
            (ids::COOKIE, Extension::Cookie),
            (ids::PSK_MODES, Extension::PskKeyExchangeModes(vec![PSK_MODE_DHE])),
            (ids::NEXT_PROTO_NEG, Extension::NextProtoNeg),
            (ids::APPLICATION_SETTINGS, Extension::ApplicationSettings(Vec::new())),
            (
                ids::RENEGOTIATION_INFO,
                Extension::RenegotiationInfo(Renegotiation::OnceAsClient),
            ),
        ];

        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Register or overwrite the descriptor for `id`.
    pub fn insert(&mut self, id: u16, extension: Extension) -> &mut Self {
        self.entries.insert(id, extension);
        self
    }

    pub fn get(&self, id: u16) -> Option<&Extension> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtensionCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_excludes_negotiable_kinds() {
        let catalogue = ExtensionCatalogue::builtin();
        for id in [
            ids::SUPPORTED_CURVES,
            ids::SUPPORTED_POINTS,
            ids::SIGNATURE_ALGORITHMS,
            ids::COMPRESS_CERTIFICATE,
            ids::SUPPORTED_VERSIONS,
            ids::KEY_SHARE,
        ] {
            assert!(!catalogue.contains(id), "{} must be filled by the assembler", id);
        }
    }

    #[test]
    fn test_builtin_entries_report_their_key() {
        let catalogue = ExtensionCatalogue::builtin();
        assert_eq!(catalogue.len(), 17);
        for (id, ext) in &catalogue.entries {
            assert_eq!(*id, ext.id());
        }
    }

    #[test]
    fn test_record_size_limit_is_unset() {
        let catalogue = ExtensionCatalogue::builtin();
        assert_eq!(
            catalogue.get(ids::RECORD_SIZE_LIMIT),
            Some(&Extension::RecordSizeLimit(0))
        );
    }

    #[test]
    fn test_alpn_default() {
        let catalogue = ExtensionCatalogue::builtin();
        assert_eq!(
            catalogue.get(ids::ALPN),
            Some(&Extension::Alpn(vec!["h2".into(), "http/1.1".into()]))
        );
    }
}
