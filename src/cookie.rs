//! Cookie storage for the HTTP layer.
//!
//! The jar is a plain in-memory store keyed by domain then name. It has no
//! interior locking; callers sharing one across tasks wrap it in a lock.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use crate::error::{Error, Result};

const NETSCAPE_HEADER: &str = "# Netscape HTTP Cookie File";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lowercase, without a leading dot.
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Only sent to `domain` itself, not its subdomains.
    pub host_only: bool,
    pub same_site: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Host-only session cookie for `domain` at path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: normalize_domain(domain.as_ref()),
            path: "/".to_string(),
            secure: false,
            http_only: false,
            host_only: true,
            same_site: None,
            expires: None,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Also match subdomains of the cookie's domain.
    pub fn include_subdomains(mut self) -> Self {
        self.host_only = false;
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    /// Parse a `Set-Cookie` value received from `request_url`.
    pub fn parse_set_cookie(header: &str, request_url: &Url) -> Result<Self> {
        let host = request_url
            .host_str()
            .ok_or_else(|| Error::cookie(format!("no host in {}", request_url)))?;

        let mut parts = header.split(';').map(str::trim);
        let (name, value) = parts
            .next()
            .and_then(|pair| pair.split_once('='))
            .ok_or_else(|| Error::cookie(format!("missing name=value in {:?}", header)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::cookie("empty cookie name"));
        }

        let mut cookie = Cookie::new(name, value.trim(), host);
        cookie.path = default_path(request_url.path());

        let mut max_age = None;
        for attr in parts {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            let val = val.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "domain" if !val.is_empty() => {
                    cookie.domain = normalize_domain(val);
                    cookie.host_only = false;
                }
                "path" if val.starts_with('/') => cookie.path = val.to_string(),
                "expires" => cookie.expires = cookie.expires.or_else(|| parse_cookie_date(val)),
                "max-age" => max_age = val.parse::<i64>().ok(),
                "samesite" => cookie.same_site = Some(val.to_string()),
                _ => {}
            }
        }
        // Max-Age wins over Expires.
        if let Some(secs) = max_age {
            cookie.expires = Some(max_age_expiry(secs));
        }

        if !domain_matches(&host.to_ascii_lowercase(), &cookie.domain, false) {
            return Err(Error::cookie(format!(
                "domain {} does not cover request host {}",
                cookie.domain, host
            )));
        }
        Ok(cookie)
    }

    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |at| at <= Utc::now())
    }

    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.secure && url.scheme() != "https" {
            return false;
        }
        if self.is_expired() {
            return false;
        }
        domain_matches(&host.to_ascii_lowercase(), &self.domain, self.host_only)
            && path_matches(url.path(), &self.path)
    }

    /// One line of a Netscape cookie file.
    pub fn to_netscape_line(&self) -> String {
        let (domain, subdomains) = if self.host_only {
            (self.domain.clone(), "FALSE")
        } else {
            (format!(".{}", self.domain), "TRUE")
        };
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            domain,
            subdomains,
            self.path,
            if self.secure { "TRUE" } else { "FALSE" },
            self.expires.map_or(0, |at| at.timestamp()),
            self.name,
            self.value
        )
    }

    pub fn from_netscape_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [domain, subdomains, path, secure, expires, name, value] = fields[..] else {
            return Err(Error::cookie(format!(
                "expected 7 tab-separated fields, got {}",
                fields.len()
            )));
        };
        Ok(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: normalize_domain(domain),
            path: path.to_string(),
            secure: secure.eq_ignore_ascii_case("true"),
            http_only: false,
            host_only: !subdomains.eq_ignore_ascii_case("true"),
            same_site: None,
            expires: expires
                .parse::<i64>()
                .ok()
                .filter(|ts| *ts > 0)
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Storage policy for a [`CookieJar`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookieJarOptions {
    /// Ignore incoming cookies whose (domain, name) matches a live cookie
    /// the jar would already send to the same URL.
    pub skip_existing: bool,
}

impl CookieJarOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct CookieJar {
    options: CookieJarOptions,
    cookies: HashMap<String, HashMap<String, Cookie>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CookieJarOptions) -> Self {
        Self {
            options,
            cookies: HashMap::new(),
        }
    }

    pub fn options(&self) -> CookieJarOptions {
        self.options
    }

    /// Store cookies received from `url`. Cookies without a domain are bound
    /// to the URL's host. Returns how many were stored.
    pub fn set_cookies<I>(&mut self, url: &str, cookies: I) -> Result<usize>
    where
        I: IntoIterator<Item = Cookie>,
    {
        let url = Url::parse(url)?;
        let host = url.host_str().map(normalize_domain).unwrap_or_default();

        // Only live cookies that would be sent to `url` count as present.
        let existing: HashSet<(String, String)> = if self.options.skip_existing {
            self.matching(&url)
                .into_iter()
                .map(|c| (c.domain.clone(), c.name.clone()))
                .collect()
        } else {
            HashSet::new()
        };

        let mut stored = 0;
        for mut cookie in cookies {
            if cookie.domain.is_empty() {
                cookie.domain = host.clone();
                cookie.host_only = true;
            }
            if existing.contains(&(cookie.domain.clone(), cookie.name.clone())) {
                tracing::debug!(
                    "Skipping cookie {} for {}: already present",
                    cookie.name,
                    cookie.domain
                );
                continue;
            }
            self.insert(cookie);
            stored += 1;
        }
        Ok(stored)
    }

    /// Parse and store `Set-Cookie` header values. Malformed values are
    /// skipped with a debug log.
    pub fn set_cookie_headers<S: AsRef<str>>(&mut self, url: &str, headers: &[S]) -> Result<usize> {
        let parsed = Url::parse(url)?;
        let cookies = headers
            .iter()
            .filter_map(|h| match Cookie::parse_set_cookie(h.as_ref(), &parsed) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::debug!("Ignoring Set-Cookie from {}: {}", url, e);
                    None
                }
            })
            .collect::<Vec<_>>();
        self.set_cookies(url, cookies)
    }

    /// Cookies to send to `url`, longest path first.
    pub fn cookies(&self, url: &str) -> Result<Vec<&Cookie>> {
        let url = Url::parse(url)?;
        let mut matching = self.matching(&url);
        matching.sort_by(|a, b| b.path.len().cmp(&a.path.len()).then_with(|| a.name.cmp(&b.name)));
        Ok(matching)
    }

    fn matching(&self, url: &Url) -> Vec<&Cookie> {
        self.cookies
            .values()
            .flat_map(HashMap::values)
            .filter(|c| c.matches(url))
            .collect()
    }

    /// `Cookie` request header value for `url`, if any cookie matches.
    pub fn cookie_header(&self, url: &str) -> Result<Option<String>> {
        let cookies = self.cookies(url)?;
        if cookies.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            cookies.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        ))
    }

    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies
            .entry(cookie.domain.clone())
            .or_default()
            .insert(cookie.name.clone(), cookie);
    }

    pub fn get(&self, domain: &str, name: &str) -> Option<&Cookie> {
        self.cookies.get(&normalize_domain(domain))?.get(name)
    }

    pub fn remove(&mut self, domain: &str, name: &str) -> Option<Cookie> {
        let domain = normalize_domain(domain);
        let bucket = self.cookies.get_mut(&domain)?;
        let removed = bucket.remove(name);
        if bucket.is_empty() {
            self.cookies.remove(&domain);
        }
        removed
    }

    /// Drop expired cookies.
    pub fn purge_expired(&mut self) {
        for bucket in self.cookies.values_mut() {
            bucket.retain(|_, c| !c.is_expired());
        }
        self.cookies.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn len(&self) -> usize {
        self.cookies.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the jar in Netscape cookie-file format. Expired cookies are left out.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(NETSCAPE_HEADER.as_bytes()).await?;
        file.write_all(b"\n").await?;
        for cookie in self.cookies.values().flat_map(HashMap::values).filter(|c| !c.is_expired()) {
            file.write_all(cookie.to_netscape_line().as_bytes()).await?;
            file.write_all(b"\n").await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// Load a Netscape cookie file, merging into the jar. Bad lines are
    /// skipped; the skip-existing policy does not apply.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let file = tokio::fs::File::open(path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut loaded = 0;
        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Cookie::from_netscape_line(line) {
                Ok(cookie) => {
                    self.insert(cookie);
                    loaded += 1;
                }
                Err(e) => tracing::debug!("Skipping cookie line: {}", e),
            }
        }
        Ok(loaded)
    }
}

/// Expiry for a Max-Age attribute. Non-positive values expire at once and
/// values past the representable range clamp to the latest date.
fn max_age_expiry(secs: i64) -> DateTime<Utc> {
    if secs <= 0 {
        return DateTime::<Utc>::MIN_UTC;
    }
    Duration::try_seconds(secs)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn domain_matches(host: &str, domain: &str, host_only: bool) -> bool {
    host == domain
        || (!host_only
            && host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/')
                || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/')))
}

/// Directory of the request path, per RFC 6265 section 5.1.4.
fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

fn parse_cookie_date(date: &str) -> Option<DateTime<Utc>> {
    for fmt in ["%a, %d %b %Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT", "%A, %d-%b-%y %H:%M:%S GMT"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(date, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_set_cookie_attributes() {
        let cookie = Cookie::parse_set_cookie(
            "sid=abc; Domain=.Example.com; Path=/app; Secure; HttpOnly; SameSite=Lax",
            &url("https://www.example.com/app/login"),
        )
        .unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.domain, "example.com");
        assert!(!cookie.host_only);
        assert_eq!(cookie.path, "/app");
        assert!(cookie.secure && cookie.http_only);
        assert_eq!(cookie.same_site.as_deref(), Some("Lax"));
    }

    #[test]
    fn test_parse_default_path_and_expiry() {
        let cookie = Cookie::parse_set_cookie(
            "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
            &url("https://example.com/docs/page"),
        )
        .unwrap();
        assert_eq!(cookie.path, "/docs");
        assert!(cookie.host_only);
        assert!(cookie.is_expired());

        let cookie = Cookie::parse_set_cookie("a=1; Max-Age=3600", &url("https://example.com")).unwrap();
        assert_eq!(cookie.path, "/");
        assert!(!cookie.is_expired());
    }

    #[test]
    fn test_max_age_extremes() {
        let u = url("https://example.com/");
        let cookie = Cookie::parse_set_cookie("a=1; Max-Age=9223372036854775807", &u).unwrap();
        assert_eq!(cookie.expires, Some(DateTime::<Utc>::MAX_UTC));
        assert!(!cookie.is_expired());

        let cookie = Cookie::parse_set_cookie("a=1; Max-Age=-9223372036854775808", &u).unwrap();
        assert!(cookie.is_expired());

        let cookie = Cookie::parse_set_cookie("a=1; Max-Age=0", &u).unwrap();
        assert!(cookie.is_expired());
    }

    #[test]
    fn test_parse_rejects_foreign_domain() {
        assert!(Cookie::parse_set_cookie("a=1; Domain=evil.com", &url("https://example.com/")).is_err());
        assert!(Cookie::parse_set_cookie("=1", &url("https://example.com/")).is_err());
        assert!(Cookie::parse_set_cookie("novalue", &url("https://example.com/")).is_err());
    }

    #[test]
    fn test_host_only_matching() {
        let host_only = Cookie::new("a", "1", "example.com");
        let wide = Cookie::new("b", "2", "example.com").include_subdomains();
        let sub = url("https://api.example.com/");
        assert!(!host_only.matches(&sub));
        assert!(wide.matches(&sub));
        assert!(!wide.matches(&url("https://notexample.com/")));
    }

    #[test]
    fn test_path_and_secure_matching() {
        let cookie = Cookie::new("a", "1", "example.com").path("/api").secure(true);
        assert!(cookie.matches(&url("https://example.com/api")));
        assert!(cookie.matches(&url("https://example.com/api/v1")));
        assert!(!cookie.matches(&url("https://example.com/apiv1")));
        assert!(!cookie.matches(&url("http://example.com/api")));
    }

    #[test]
    fn test_netscape_line_keeps_subdomain_flag() {
        let cookie = Cookie::new("a", "1", "example.com").include_subdomains();
        let line = cookie.to_netscape_line();
        assert!(line.starts_with(".example.com\tTRUE\t/\tFALSE\t0\ta\t1"));
        assert_eq!(Cookie::from_netscape_line(&line).unwrap(), cookie);
        assert!(Cookie::from_netscape_line("too\tfew").is_err());
    }

    #[test]
    fn test_skip_existing() {
        let mut jar = CookieJar::with_options(CookieJarOptions::new().skip_existing(true));
        let u = "https://example.com/";
        assert_eq!(jar.set_cookies(u, [Cookie::new("a", "1", "example.com")]).unwrap(), 1);
        assert_eq!(
            jar.set_cookies(u, [Cookie::new("a", "2", "example.com"), Cookie::new("b", "3", "example.com")])
                .unwrap(),
            1
        );
        assert_eq!(jar.get("example.com", "a").unwrap().value, "1");

        let mut jar = CookieJar::new();
        jar.set_cookies(u, [Cookie::new("a", "1", "example.com")]).unwrap();
        jar.set_cookies(u, [Cookie::new("a", "2", "example.com")]).unwrap();
        assert_eq!(jar.get("example.com", "a").unwrap().value, "2");
    }

    #[test]
    fn test_skip_existing_ignores_expired_and_unmatched() {
        let mut jar = CookieJar::with_options(CookieJarOptions::new().skip_existing(true));
        jar.insert(Cookie::new("sid", "old", "example.com").expires(Utc::now() - Duration::hours(1)));
        jar.insert(Cookie::new("pref", "a", "example.com").path("/admin"));

        let u = "https://example.com/";
        let stored = jar
            .set_cookies(
                u,
                [
                    Cookie::new("sid", "new", "example.com"),
                    Cookie::new("pref", "b", "example.com").path("/admin"),
                ],
            )
            .unwrap();
        assert_eq!(stored, 2);
        assert_eq!(jar.cookie_header(u).unwrap().as_deref(), Some("sid=new"));
    }

    #[test]
    fn test_empty_domain_binds_to_host() {
        let mut jar = CookieJar::new();
        let mut cookie = Cookie::new("a", "1", "");
        cookie.host_only = false;
        jar.set_cookies("https://Shop.Example.com/cart", [cookie]).unwrap();
        let stored = jar.get("shop.example.com", "a").unwrap();
        assert!(stored.host_only);
    }

    #[test]
    fn test_cookie_header_orders_by_path() {
        let mut jar = CookieJar::new();
        jar.insert(Cookie::new("root", "1", "example.com"));
        jar.insert(Cookie::new("deep", "2", "example.com").path("/a/b"));
        assert_eq!(
            jar.cookie_header("https://example.com/a/b/c").unwrap().as_deref(),
            Some("deep=2; root=1")
        );
        assert_eq!(jar.cookie_header("https://other.com/").unwrap(), None);
        assert!(jar.cookies("not a url").is_err());
    }

    #[test]
    fn test_remove_and_purge() {
        let mut jar = CookieJar::new();
        jar.insert(Cookie::new("a", "1", "example.com"));
        jar.insert(Cookie::new("old", "x", "example.com").expires(Utc::now() - Duration::hours(1)));
        assert_eq!(jar.len(), 2);
        jar.purge_expired();
        assert_eq!(jar.len(), 1);
        assert!(jar.remove(".EXAMPLE.com", "a").is_some());
        assert!(jar.is_empty());
    }
}
