//! Cookie housekeeping.
//!
//! Browsers accumulate `http_*` cookies from other local dev servers on the
//! same host, which inflates every request's `Cookie` header. A sweep keeps
//! the allow-listed names and expires every other `http_` prefixed cookie.

/// Cookie names that are never expired
pub const RETAINED_COOKIES: &[&str] = &["token"];

/// Prefix of cookies eligible for expiry
pub const SWEPT_PREFIX: &str = "http_";

const EPOCH_EXPIRY: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Outcome of sweeping a `Cookie` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSweep {
    /// `name=value` pairs that survive, in original order
    pub kept: Vec<String>,
    /// Names of cookies that must be expired
    pub expired: Vec<String>,
}

impl CookieSweep {
    /// Whether any cookie was dropped
    pub fn is_clean(&self) -> bool {
        self.expired.is_empty()
    }

    /// The surviving cookies formatted as a `Cookie` header value
    pub fn header_value(&self) -> Option<String> {
        if self.kept.is_empty() {
            None
        } else {
            Some(self.kept.join("; "))
        }
    }

    /// `Set-Cookie` values that expire the dropped cookies
    pub fn expiry_directives(&self) -> Vec<String> {
        self.expired
            .iter()
            .map(|name| format!("{}=; expires={}; path=/", name, EPOCH_EXPIRY))
            .collect()
    }
}

/// Whether a cookie with this name is expired by a sweep
pub fn should_expire(name: &str) -> bool {
    !RETAINED_COOKIES.contains(&name) && name.starts_with(SWEPT_PREFIX)
}

/// Sweep a `Cookie` header value (`a=1; b=2`)
pub fn sweep(header: &str) -> CookieSweep {
    sweep_pairs(header.split(';'))
}

/// Sweep individual `name=value` pairs
pub fn sweep_pairs<'a, I>(pairs: I) -> CookieSweep
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = CookieSweep::default();

    for pair in pairs {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let name = pair.split('=').next().unwrap_or_default().trim();
        if should_expire(name) {
            result.expired.push(name.to_string());
        } else {
            result.kept.push(pair.to_string());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_token_survives() {
        let sweep = sweep_pairs(["http_x=1", "token=abc", "http_y=2"]);

        assert_eq!(sweep.kept, vec!["token=abc"]);
        assert_eq!(sweep.expired, vec!["http_x", "http_y"]);
        assert_eq!(sweep.header_value().as_deref(), Some("token=abc"));
    }

    #[test]
    fn test_unprefixed_cookies_are_kept() {
        let sweep = sweep("session=1; http_trace=abc; lang=zh");

        assert_eq!(sweep.kept, vec!["session=1", "lang=zh"]);
        assert_eq!(sweep.expired, vec!["http_trace"]);
    }

    #[test]
    fn test_expiry_directive_format() {
        let sweep = sweep("http_x=1");
        assert_eq!(
            sweep.expiry_directives(),
            vec!["http_x=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/"]
        );
        assert!(sweep.header_value().is_none());
    }

    #[test]
    fn test_empty_header() {
        let sweep = sweep("");
        assert!(sweep.is_clean());
        assert!(sweep.kept.is_empty());
    }

    #[test]
    fn test_allow_list_wins_over_prefix() {
        assert!(!should_expire("token"));
        assert!(should_expire("http_token"));
        assert!(!should_expire("xhttp_a"));
    }
}
