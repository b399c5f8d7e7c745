use std::collections::HashMap;
use std::time::Duration;

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::types::ChannelKey;

/// Prefix of the per-channel unlock cookie; the channel key is the suffix.
pub const PROOF_COOKIE_PREFIX: &str = "btv_channel_unlocked_";

/// Lifetime of an unlock cookie.
pub const PROOF_TTL: Duration = Duration::from_secs(12 * 60 * 60);

const UNLOCKED: &str = "1";

/// Read access to the credentials of the request being served.
pub trait CredentialSource {
    fn credential(&self, name: &str) -> Option<&str>;
}

impl CredentialSource for HashMap<String, String> {
    fn credential(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Cookies sent with a request.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    values: HashMap<String, String>,
}

impl RequestCookies {
    /// Parse every `Cookie` header. Unparseable pairs are skipped and the
    /// first occurrence of a name wins.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(raw).flatten() {
                values
                    .entry(cookie.name().to_string())
                    .or_insert_with(|| cookie.value().to_string());
            }
        }
        Self { values }
    }
}

impl CredentialSource for RequestCookies {
    fn credential(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

pub fn proof_cookie_name(key: &ChannelKey) -> String {
    format!("{PROOF_COOKIE_PREFIX}{key}")
}

/// Whether the request carries an unlock for this channel. Only the exact
/// value `"1"` counts.
pub fn has_proof(creds: &impl CredentialSource, key: &ChannelKey) -> bool {
    creds.credential(&proof_cookie_name(key)) == Some(UNLOCKED)
}

/// The `Set-Cookie` that records an unlock.
pub fn proof_cookie(key: &ChannelKey, ttl: Duration, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((proof_cookie_name(key), UNLOCKED))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(max_age))
        .build()
}

#[derive(Debug, Error)]
#[error("channel passcode is not configured (set CHANNEL_PASSCODE)")]
pub struct PasscodeNotConfigured;

/// Checks user-supplied passcodes for protected channels.
#[derive(Clone)]
pub struct PasscodeGate {
    passcode: Option<String>,
}

impl PasscodeGate {
    /// Surrounding whitespace is ignored on both the configured passcode and
    /// the candidates checked against it.
    pub fn new(passcode: Option<String>) -> Self {
        Self {
            passcode: passcode
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.passcode.is_some()
    }

    pub fn verify(&self, candidate: &str) -> Result<bool, PasscodeNotConfigured> {
        let expected = self.passcode.as_deref().ok_or(PasscodeNotConfigured)?;
        Ok(expected.as_bytes().ct_eq(candidate.trim().as_bytes()).into())
    }
}

impl std::fmt::Debug for PasscodeGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn creds(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_has_proof_only_for_exact_sentinel() {
        let key = ChannelKey::from(24u64);
        assert!(!has_proof(&creds(&[]), &key));
        assert!(!has_proof(&creds(&[("btv_channel_unlocked_24", "0")]), &key));
        assert!(!has_proof(&creds(&[("btv_channel_unlocked_24", "true")]), &key));
        assert!(!has_proof(&creds(&[("btv_channel_unlocked_24", " 1")]), &key));
        assert!(!has_proof(&creds(&[("btv_channel_unlocked_25", "1")]), &key));
        assert!(has_proof(&creds(&[("btv_channel_unlocked_24", "1")]), &key));
    }

    #[test]
    fn test_request_cookies_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; btv_channel_unlocked_23=1"),
        );
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("btv_channel_unlocked_23=0; btv_channel_unlocked_27=0"),
        );

        let cookies = RequestCookies::from_headers(&headers);
        assert!(has_proof(&cookies, &ChannelKey::from("23")));
        assert!(!has_proof(&cookies, &ChannelKey::from("27")));
        assert!(!has_proof(&cookies, &ChannelKey::from("28")));
    }

    #[test]
    fn test_proof_cookie_attributes() {
        let cookie = proof_cookie(&ChannelKey::from(26u64), PROOF_TTL, true);
        assert_eq!(cookie.name(), "btv_channel_unlocked_26");
        assert_eq!(cookie.value(), "1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.max_age(),
            Some(cookie::time::Duration::seconds(12 * 60 * 60))
        );
    }

    #[test]
    fn test_passcode_gate() {
        let gate = PasscodeGate::new(Some("open-sesame".into()));
        assert!(gate.verify("open-sesame").unwrap());
        assert!(gate.verify(" open-sesame\n").unwrap());
        assert!(!gate.verify("open").unwrap());
        assert!(!gate.verify("").unwrap());

        let unset = PasscodeGate::new(Some(String::new()));
        assert!(!unset.is_configured());
        assert!(unset.verify("anything").is_err());

        let blank = PasscodeGate::new(Some("  \n".into()));
        assert!(!blank.is_configured());
    }

    #[test]
    fn test_passcode_gate_trims_configured_value() {
        let gate = PasscodeGate::new(Some("  open-sesame\n".into()));
        assert!(gate.verify("open-sesame").unwrap());
        assert!(gate.verify(" open-sesame ").unwrap());
        assert!(!gate.verify("  open-sesame\n extra").unwrap());
    }
}
