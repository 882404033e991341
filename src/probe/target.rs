//! Probe target computation and loopback rewriting.

use std::borrow::Cow;
use std::net::IpAddr;

use reqwest::Url;

use crate::config::{GENERAL_INFO_PATH, LOOPBACK_V4, LOOPBACK_V6};
use crate::error_handling::{ProbeError, ProbeErrorType};

/// Where to send the probe for an entry's `ip`.
///
/// When `self_address` is known and appears in `ip` as a whole host token, the
/// first such occurrence is replaced by loopback so a probe of this very machine
/// doesn't leave it. The port, scheme and anything else in `ip` are kept. A
/// match has to end at a host boundary, so `10.0.0.1` is not found inside
/// `10.0.0.12`.
pub fn probe_target(ip: &str, self_address: Option<IpAddr>) -> Cow<'_, str> {
    let Some(self_address) = self_address else {
        return Cow::Borrowed(ip);
    };
    let needle = self_address.to_string();
    let loopback = match self_address {
        IpAddr::V4(_) => LOOPBACK_V4,
        IpAddr::V6(_) => LOOPBACK_V6,
    };

    for (start, _) in ip.match_indices(needle.as_str()) {
        let end = start + needle.len();
        let before_ok = ip[..start]
            .chars()
            .next_back()
            .map_or(true, |c| matches!(c, '/' | '@' | '['));
        let after_ok = ip[end..]
            .chars()
            .next()
            .map_or(true, |c| matches!(c, ':' | ']' | '/'));
        if before_ok && after_ok {
            let mut rewritten = String::with_capacity(ip.len());
            rewritten.push_str(&ip[..start]);
            rewritten.push_str(loopback);
            rewritten.push_str(&ip[end..]);
            return Cow::Owned(rewritten);
        }
    }
    Cow::Borrowed(ip)
}

/// Full URL of the self-description document on `target`.
///
/// Targets without a scheme are reached over plain `http`.
pub fn general_info_url(target: &str) -> Result<Url, ProbeError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ProbeError::new(ProbeErrorType::InvalidTarget, "empty ip"));
    }
    let base = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };
    let raw = format!("{}{}", base.trim_end_matches('/'), GENERAL_INFO_PATH);

    let url = Url::parse(&raw)
        .map_err(|e| ProbeError::new(ProbeErrorType::InvalidTarget, format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProbeError::new(
            ProbeErrorType::InvalidTarget,
            format!("unsupported scheme {other} in {raw}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_rewrites_own_address_keeping_port() {
        let target = probe_target("203.0.113.5:8080", addr("203.0.113.5"));
        assert_eq!(target, "127.0.0.1:8080");
    }

    #[test]
    fn test_unrelated_address_unchanged() {
        let target = probe_target("198.51.100.9:8080", addr("203.0.113.5"));
        assert_eq!(target, "198.51.100.9:8080");
        assert!(matches!(target, Cow::Borrowed(_)));
    }

    #[test]
    fn test_no_self_address_no_rewrite() {
        assert_eq!(probe_target("203.0.113.5:8080", None), "203.0.113.5:8080");
    }

    #[test]
    fn test_prefix_of_longer_address_is_not_rewritten() {
        assert_eq!(
            probe_target("10.0.0.12:3000", addr("10.0.0.1")),
            "10.0.0.12:3000"
        );
        assert_eq!(probe_target("110.0.0.1", addr("10.0.0.1")), "110.0.0.1");
    }

    #[test]
    fn test_rewrite_with_scheme_and_bare_host() {
        assert_eq!(
            probe_target("https://203.0.113.5/", addr("203.0.113.5")),
            "https://127.0.0.1/"
        );
        assert_eq!(probe_target("203.0.113.5", addr("203.0.113.5")), "127.0.0.1");
    }

    #[test]
    fn test_rewrite_bracketed_ipv6() {
        assert_eq!(
            probe_target("[2001:db8::1]:8080", addr("2001:db8::1")),
            "[::1]:8080"
        );
    }

    #[test]
    fn test_general_info_url() {
        assert_eq!(
            general_info_url("10.0.0.5").unwrap().as_str(),
            "http://10.0.0.5/general_info.json"
        );
        assert_eq!(
            general_info_url("127.0.0.1:8080/").unwrap().as_str(),
            "http://127.0.0.1:8080/general_info.json"
        );
        assert_eq!(
            general_info_url("https://taxi.example.com").unwrap().as_str(),
            "https://taxi.example.com/general_info.json"
        );
    }

    #[test]
    fn test_general_info_url_rejects_bad_targets() {
        let err = general_info_url("   ").unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::InvalidTarget);
        let err = general_info_url("ftp://10.0.0.5").unwrap_err();
        assert_eq!(err.kind, ProbeErrorType::InvalidTarget);
    }
}
