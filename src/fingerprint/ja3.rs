//! JA3 descriptor decoding and rendering.
//!
//! JA3 format: `SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats`
//!
//! - Fields separated by commas
//! - Values within each field separated by dashes
//! - All values in decimal
//! - An empty field is an empty list

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};

use super::extension::{is_grease_u16, Extension};
use super::params::version;
use super::tls::ClientHelloSpec;
use crate::error::{Error, Result};

const FIELD_COUNT: usize = 5;

/// The five ordered fields of a JA3 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Tokens {
    /// Record version. Informational only.
    pub version: u16,
    pub cipher_suites: Vec<u16>,
    pub extensions: Vec<u16>,
    pub curves: Vec<u16>,
    pub point_formats: Vec<u8>,
}

impl Ja3Tokens {
    /// Decode a JA3 string.
    pub fn parse(ja3: &str) -> Result<Self> {
        let fields: Vec<&str> = ja3.split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(Error::malformed(format!(
                "expected {} comma-separated fields, got {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let version = parse_token::<u16>(fields[0], "version")?;

        Ok(Self {
            version,
            cipher_suites: parse_list(fields[1], "cipher")?,
            extensions: parse_list(fields[2], "extension")?,
            curves: parse_list(fields[3], "curve")?,
            point_formats: parse_list(fields[4], "point format")?,
        })
    }
}

impl FromStr for Ja3Tokens {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Ja3Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.version,
            join(&self.cipher_suites),
            join(&self.extensions),
            join(&self.curves),
            join(&self.point_formats)
        )
    }
}

/// Split a dash-separated field. A field holding only the empty string is
/// an empty list rather than one empty token.
fn parse_list<T: FromStr>(field: &str, name: &'static str) -> Result<Vec<T>> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .map(|token| parse_token(token, name))
        .collect()
}

/// Unsigned decimal only: no sign, no whitespace.
fn parse_token<T: FromStr>(token: &str, name: &'static str) -> Result<T> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_token(name, token));
    }
    token.parse::<T>().map_err(|_| Error::invalid_token(name, token))
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// JA3 fingerprint of a compiled ClientHello specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Fingerprint {
    /// The raw string before hashing.
    pub raw_string: String,
    /// 32-character MD5 hex hash.
    pub hash: String,
}

impl Ja3Fingerprint {
    /// Render the JA3 string a peer would observe for `spec`.
    ///
    /// GREASE values are filtered from every field. The version field is the
    /// legacy record version, always TLS 1.2 for TLS 1.3 capable hellos.
    pub fn from_spec(spec: &ClientHelloSpec) -> Self {
        let ciphers: Vec<u16> = spec
            .cipher_suites
            .iter()
            .copied()
            .filter(|c| !is_grease_u16(*c))
            .collect();

        let extensions: Vec<u16> = spec
            .extensions
            .iter()
            .map(Extension::id)
            .filter(|id| !is_grease_u16(*id))
            .collect();

        let mut curves = Vec::new();
        let mut point_formats = Vec::new();
        for ext in &spec.extensions {
            match ext {
                Extension::SupportedCurves(groups) => {
                    curves = groups.iter().copied().filter(|g| !is_grease_u16(*g)).collect();
                }
                Extension::SupportedPoints(points) => point_formats = points.clone(),
                _ => {}
            }
        }

        let raw_string = format!(
            "{},{},{},{},{}",
            version::TLS12,
            join(&ciphers),
            join(&extensions),
            join(&curves),
            join(&point_formats)
        );

        let mut hasher = Md5::new();
        hasher.update(raw_string.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        Self { raw_string, hash }
    }
}

impl fmt::Display for Ja3Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let tokens = Ja3Tokens::parse("771,4865-4866,0-23-65281,29-23-24,0").unwrap();
        assert_eq!(tokens.version, 771);
        assert_eq!(tokens.cipher_suites, vec![4865, 4866]);
        assert_eq!(tokens.extensions, vec![0, 23, 65281]);
        assert_eq!(tokens.curves, vec![29, 23, 24]);
        assert_eq!(tokens.point_formats, vec![0]);
    }

    #[test]
    fn test_parse_empty_fields() {
        let tokens = Ja3Tokens::parse("771,,,,").unwrap();
        assert!(tokens.cipher_suites.is_empty());
        assert!(tokens.extensions.is_empty());
        assert!(tokens.curves.is_empty());
        assert!(tokens.point_formats.is_empty());
    }

    #[test]
    fn test_parse_wrong_field_count() {
        for ja3 in ["771,4865,0,29", "771,4865,0,29,0,1", ""] {
            let err = Ja3Tokens::parse(ja3).unwrap_err();
            assert!(matches!(err, Error::MalformedDescriptor(_)), "{:?}", ja3);
        }
    }

    #[test]
    fn test_parse_names_offending_token() {
        let err = Ja3Tokens::parse("771,4865-abc,0,29,0").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidToken { field: "cipher", ref token } if token == "abc"
        ));

        let err = Ja3Tokens::parse("771,4865,0-70000,29,0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "extension", .. }));

        // Point formats are single bytes.
        let err = Ja3Tokens::parse("771,4865,0,29,256").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "point format", .. }));

        // A trailing dash leaves an empty token, which is not an empty field.
        let err = Ja3Tokens::parse("771,4865-,0,29,0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "cipher", ref token } if token.is_empty()));
    }

    #[test]
    fn test_parse_rejects_signs_and_whitespace() {
        let err = Ja3Tokens::parse("771,+4865,0,29,0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "cipher", ref token } if token == "+4865"));

        let err = Ja3Tokens::parse(" 771,4865,0,29,0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "version", .. }));

        let err = Ja3Tokens::parse("771,4865,0- 23,29,0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "extension", .. }));

        let err = Ja3Tokens::parse("771,4865,0,29,+0").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { field: "point format", .. }));
    }

    #[test]
    fn test_display_restores_string() {
        let ja3 = "771,4865-4866-4867,0-23-65281-10-11,29-23-24,0";
        assert_eq!(Ja3Tokens::parse(ja3).unwrap().to_string(), ja3);
    }
}
