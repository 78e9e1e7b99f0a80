//! SSRF guard: refuses URLs that point at private, loopback, or unspecified
//! addresses before any outbound fetch is made.
//!
//! Called once by the orchestrator for the raw input URL before any provider
//! runs; providers receive the already-vetted [`Url`]. Results are not
//! cached; call volume is one lookup per user-initiated preview request.

use std::future::Future;
use std::net::IpAddr;

use url::Url;

use crate::error::ExtractError;

/// Parse and vet a raw URL string. On success returns the parsed [`Url`].
///
/// Rejection conditions:
/// - not an absolute `http`/`https` URL,
/// - hostname is a literal IP in a private/loopback/unspecified range,
/// - hostname resolves (forward DNS, either address family) to such a range.
///
/// # Errors
///
/// [`ExtractError::InvalidUrl`] for unparseable input,
/// [`ExtractError::UnsafeUrl`] for everything the guard refuses.
pub async fn assert_url_is_safe(raw: &str) -> Result<Url, ExtractError> {
    assert_url_is_safe_with(raw, resolve_host).await
}

/// Same as [`assert_url_is_safe`] but with an injectable resolver, so the
/// DNS-dependent branch can be tested without real lookups.
pub async fn assert_url_is_safe_with<F, Fut>(raw: &str, resolve: F) -> Result<Url, ExtractError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = std::io::Result<Vec<IpAddr>>>,
{
    let url = parse_http_url(raw)?;

    let host = url
        .host_str()
        .ok_or_else(|| ExtractError::UnsafeUrl {
            reason: "URL has no host".to_string(),
        })?
        .trim_matches(['[', ']']);

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(ExtractError::UnsafeUrl {
                reason: format!("{ip} is a private or loopback address"),
            });
        }
        return Ok(url);
    }

    let addrs = resolve(host.to_string())
        .await
        .map_err(|e| ExtractError::UnsafeUrl {
            reason: format!("host {host} did not resolve: {e}"),
        })?;

    if let Some(ip) = addrs.into_iter().find(|ip| is_private_ip(*ip)) {
        return Err(ExtractError::UnsafeUrl {
            reason: format!("host {host} resolves to private address {ip}"),
        });
    }

    Ok(url)
}

/// Parse a raw string as an absolute `http`/`https` URL without any host
/// vetting. Used when the guard is intentionally relaxed (loopback mock
/// servers in tests).
///
/// # Errors
///
/// [`ExtractError::InvalidUrl`] for unparseable input,
/// [`ExtractError::UnsafeUrl`] for a non-http(s) scheme.
pub fn parse_http_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw).map_err(|e| ExtractError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractError::UnsafeUrl {
            reason: format!("scheme {other} is not allowed, only http/https"),
        }),
    }
}

async fn resolve_host(host: String) -> std::io::Result<Vec<IpAddr>> {
    // Port is irrelevant for the lookup; 443 keeps the tuple form happy.
    let addrs = tokio::net::lookup_host((host.as_str(), 443)).await?;
    Ok(addrs.map(|sa| sa.ip()).collect())
}

/// Private / loopback / unspecified ranges: 10.0.0.0/8, 172.16.0.0/12,
/// 192.168.0.0/16, 127.0.0.0/8, 0.0.0.0/8, plus the IPv6 loopback,
/// unspecified, unique-local, link-local, and v4-mapped equivalents.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || octets[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                // fe80::/10 link local
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}
