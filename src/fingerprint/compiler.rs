//! Specification assembler: turns a JA3 string plus negotiable parameters
//! into a [`ClientHelloSpec`].

use super::catalogue::ExtensionCatalogue;
use super::extension::{ids, Extension};
use super::ja3::Ja3Tokens;
use super::params::{NegotiableParams, ParameterTables, ResolvedParams};
use super::tls::ClientHelloSpec;
use crate::error::{Error, Result};

/// Compiles JA3 descriptors against an injected extension catalogue and
/// parameter tables. Stateless after construction and safe to share.
#[derive(Debug, Clone, Default)]
pub struct FingerprintCompiler {
    catalogue: ExtensionCatalogue,
    tables: ParameterTables,
}

impl FingerprintCompiler {
    pub fn new(catalogue: ExtensionCatalogue, tables: ParameterTables) -> Self {
        Self { catalogue, tables }
    }

    pub fn catalogue(&self) -> &ExtensionCatalogue {
        &self.catalogue
    }

    pub fn tables(&self) -> &ParameterTables {
        &self.tables
    }

    /// Decode, resolve and assemble in one step.
    pub fn compile(&self, ja3: &str, params: &NegotiableParams) -> Result<ClientHelloSpec> {
        let tokens = Ja3Tokens::parse(ja3)?;
        let resolved = self.tables.resolve(params)?;
        self.assemble(&tokens, &resolved)
    }

    /// Reusable factory producing a fresh specification per call.
    pub fn spec_factory(
        &self,
        ja3: impl Into<String>,
        params: NegotiableParams,
    ) -> impl Fn() -> Result<ClientHelloSpec> + Send + Sync + 'static {
        let compiler = self.clone();
        let ja3 = ja3.into();
        move || compiler.compile(&ja3, &params)
    }

    /// Build the specification from decoded tokens and resolved parameters.
    ///
    /// Every extension id must have a descriptor, either from the catalogue
    /// or from the negotiable parameters; nothing is invented for unknown ids.
    pub fn assemble(&self, tokens: &Ja3Tokens, resolved: &ResolvedParams) -> Result<ClientHelloSpec> {
        let mut catalogue = self.catalogue.clone();

        catalogue
            .insert(ids::SUPPORTED_CURVES, Extension::SupportedCurves(tokens.curves.clone()))
            .insert(
                ids::SUPPORTED_POINTS,
                Extension::SupportedPoints(tokens.point_formats.clone()),
            )
            .insert(
                ids::SUPPORTED_VERSIONS,
                Extension::SupportedVersions(resolved.versions.clone()),
            )
            .insert(
                ids::SIGNATURE_ALGORITHMS,
                Extension::SignatureAlgorithms(resolved.signature_algorithms.clone()),
            )
            .insert(ids::KEY_SHARE, Extension::KeyShare(resolved.key_shares.clone()));

        match resolved.cert_compression {
            Some(algo) => {
                catalogue.insert(
                    ids::COMPRESS_CERTIFICATE,
                    Extension::CompressCertificate(vec![algo]),
                );
            }
            None if tokens.extensions.contains(&ids::COMPRESS_CERTIFICATE) => {
                // Assembly below fails on id 27 unless the injected catalogue has a default.
                tracing::warn!(
                    "JA3 references compress_certificate ({}) but no certificate compression algorithm was resolved",
                    ids::COMPRESS_CERTIFICATE
                );
            }
            None => {}
        }

        let extensions = tokens
            .extensions
            .iter()
            .map(|id| catalogue.get(*id).cloned().ok_or(Error::UnknownExtension(*id)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Compiled ClientHello: {} cipher suites, {} extensions",
            tokens.cipher_suites.len(),
            extensions.len()
        );

        Ok(ClientHelloSpec::new(tokens.cipher_suites.clone(), extensions))
    }
}
