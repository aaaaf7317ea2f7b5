//! Joining and normalizing provider URLs.
//!
//! Paths supplied by callers are expected to already contain valid segments;
//! no percent-encoding happens here. Query parameters are attached later by
//! the request builder with standard query encoding.

/// Join a base URL and a relative path into one normalized absolute URL.
pub fn join(base: &str, path: &str) -> String {
    normalize(&format!("{base}/{path}"))
}

/// Collapse every run of consecutive slashes into a single slash, keeping
/// exactly two after an `http:` or `https:` scheme colon.
///
/// Idempotent: normalizing an already-normalized URL yields the same string.
pub fn normalize(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut chars = url.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            while chars.peek() == Some(&'/') {
                chars.next();
            }
            out.push('/');
            if out.ends_with("http:/") || out.ends_with("https:/") {
                out.push('/');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_duplicate_slashes() {
        assert_eq!(normalize("https://host//a//b"), "https://host/a/b");
        assert_eq!(normalize("http://host///x"), "http://host/x");
    }

    #[test]
    fn preserves_scheme_double_slash() {
        assert_eq!(normalize("https://host/a"), "https://host/a");
        assert_eq!(normalize("http://host"), "http://host");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "https://host//a//b",
            "http://host/",
            "https://api.example.com///v1////users",
            "//relative//path",
            "host/no/scheme",
            "https://host/a?x=1//2",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample}");
        }
    }

    #[test]
    fn join_inserts_exactly_one_separator() {
        assert_eq!(
            join("https://api.example.com", "v1/users"),
            "https://api.example.com/v1/users"
        );
        assert_eq!(
            join("https://api.example.com/", "/v1/users"),
            "https://api.example.com/v1/users"
        );
        assert_eq!(
            join("https://api.example.com//", "//v1//users"),
            "https://api.example.com/v1/users"
        );
    }

    #[test]
    fn join_starts_with_normalized_base() {
        let base = "https://api.example.com";
        assert!(join(base, "anything/here").starts_with(base));
    }
}
