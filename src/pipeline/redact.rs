//! Signature redaction for logged URLs.
//!
//! # Responsibilities
//! - Detect a `sig` query parameter (any case, any position)
//! - Replace its values with a fixed marker in a canonical re-encoding
//! - Produce a separate URI for logging; the live request is never touched
//!
//! # Design Decisions
//! - The common no-signature path neither parses nor allocates (`Cow::Borrowed`)
//! - Names are matched after form-urldecoding, so `si%67` is a signature too
//! - Canonical form matches form-urlencoding with keys sorted, so log lines for
//!   the same request are stable across attempts

use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::http::uri::{PathAndQuery, Uri};
use url::form_urlencoded;

/// Query parameter carrying the shared access signature.
pub const SIG_PARAM: &str = "sig";

/// Literal written in place of every redacted value.
pub const REDACTED: &str = "REDACTED";

fn is_sig_name(name: &str) -> bool {
    if !name.contains(['%', '+']) {
        return name.eq_ignore_ascii_case(SIG_PARAM);
    }
    // Escaped names are compared the way the service decodes them.
    form_urlencoded::parse(name.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.eq_ignore_ascii_case(SIG_PARAM))
        .unwrap_or(false)
}

fn has_sig_param(raw_query: &str) -> bool {
    raw_query.split('&').any(|pair| {
        pair.split_once('=')
            .map(|(name, _)| is_sig_name(name))
            .unwrap_or(false)
    })
}

/// Redact the value of every `sig` parameter in `raw_query`.
///
/// Returns `(false, raw_query)` unchanged when no `sig=` parameter is present.
/// Otherwise returns `true` and the full parameter set re-encoded with keys
/// sorted and every `sig` value (compared ignoring ASCII case) replaced by
/// [`REDACTED`].
pub fn redact_sig_query_param(raw_query: &str) -> (bool, Cow<'_, str>) {
    if !has_sig_param(raw_query) {
        return (false, Cow::Borrowed(raw_query));
    }

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in form_urlencoded::parse(raw_query.as_bytes()) {
        params.entry(name.into_owned()).or_default().push(value.into_owned());
    }

    let mut serializer = form_urlencoded::Serializer::new(String::with_capacity(raw_query.len()));
    for (name, values) in &params {
        let redact = name.eq_ignore_ascii_case(SIG_PARAM);
        for value in values {
            serializer.append_pair(name, if redact { REDACTED } else { value });
        }
    }

    (true, Cow::Owned(serializer.finish()))
}

/// Return a URI that is safe to log.
///
/// Borrows `uri` when there is nothing to redact. When a signature is found a
/// new `Uri` is built; if that fails the query is dropped entirely rather than
/// risk logging the secret.
pub fn redacted_uri(uri: &Uri) -> Cow<'_, Uri> {
    let Some(query) = uri.query() else {
        return Cow::Borrowed(uri);
    };

    let (found, redacted) = redact_sig_query_param(query);
    if !found {
        return Cow::Borrowed(uri);
    }

    let path = uri.path();
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = PathAndQuery::try_from(format!("{}?{}", path, redacted))
        .or_else(|_| PathAndQuery::try_from(path))
        .ok();

    match Uri::from_parts(parts) {
        Ok(redacted) => Cow::Owned(redacted),
        Err(_) => Cow::Owned(Uri::from_static("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sig_returns_same_string() {
        let raw = "comp=list&restype=container";
        let (found, out) = redact_sig_query_param(raw);
        assert!(!found);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, raw);
    }

    #[test]
    fn lookalike_names_are_not_redacted() {
        for raw in ["signature=abc", "xsig=abc&comp=list", "comp=sig", "sig"] {
            let (found, out) = redact_sig_query_param(raw);
            assert!(!found, "{raw}");
            assert_eq!(out, raw);
        }
    }

    #[test]
    fn sig_first_parameter() {
        let (found, out) = redact_sig_query_param("sig=ABCD&comp=list");
        assert!(found);
        assert!(out.contains("comp=list"));
        assert!(out.contains("sig=REDACTED"));
        assert!(!out.contains("ABCD"));
    }

    #[test]
    fn sig_subsequent_parameter_any_case() {
        let (found, out) = redact_sig_query_param("sv=2016-05-31&SiG=s3cr3t%2Bvalue&se=2030");
        assert!(found);
        assert_eq!(out, "SiG=REDACTED&se=2030&sv=2016-05-31");
        assert!(!out.contains("s3cr3t"));
    }

    #[test]
    fn every_sig_value_is_redacted() {
        let (found, out) = redact_sig_query_param("sig=one&a=1&sig=two&SIG=three&a=2");
        assert!(found);
        assert_eq!(out, "SIG=REDACTED&a=1&a=2&sig=REDACTED&sig=REDACTED");
    }

    #[test]
    fn escaped_sig_name_is_redacted() {
        let (found, out) = redact_sig_query_param("comp=list&si%67=SECRET");
        assert!(found);
        assert_eq!(out, "comp=list&sig=REDACTED");

        let (found, out) = redact_sig_query_param("a=1&S%49G=SECRET");
        assert!(found);
        assert_eq!(out, "SIG=REDACTED&a=1");
        assert!(!out.contains("SECRET"));
    }

    #[test]
    fn escaped_lookalike_names_are_not_redacted() {
        for raw in ["x+sig=abc", "si%67n=abc&comp=list", "%73ig%20=abc"] {
            let (found, out) = redact_sig_query_param(raw);
            assert!(!found, "{raw}");
            assert_eq!(out, raw);
        }
    }

    #[test]
    fn redacted_uri_builds_new_uri() {
        let uri: Uri = "https://acct.blob.core.windows.net/c/b?comp=list&sig=ABCD"
            .parse()
            .unwrap();
        let safe = redacted_uri(&uri);
        assert!(matches!(safe, Cow::Owned(_)));
        assert_eq!(
            safe.to_string(),
            "https://acct.blob.core.windows.net/c/b?comp=list&sig=REDACTED"
        );
        // original untouched
        assert_eq!(uri.query(), Some("comp=list&sig=ABCD"));
    }

    #[test]
    fn redacted_uri_borrows_without_sig() {
        let uri: Uri = "https://acct.blob.core.windows.net/c/b?comp=list".parse().unwrap();
        assert!(matches!(redacted_uri(&uri), Cow::Borrowed(_)));

        let bare: Uri = "/c/b".parse().unwrap();
        assert!(matches!(redacted_uri(&bare), Cow::Borrowed(_)));
    }
}
