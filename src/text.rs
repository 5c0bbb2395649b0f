//! Game-text normalization.
//!
//! Widget text arrives with inline markup (`<col=ff0000>`, `<br>`), embedded
//! non-breaking spaces, and uneven whitespace. Everything downstream — the
//! extractor, the fingerprints, the spoken phrases — works on the normalized
//! form produced here.

/// Strip `<...>` markup spans, convert non-breaking spaces to regular spaces,
/// collapse whitespace runs to a single space, and trim.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    let mut pending_space = false;

    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // A tag acts as a word separator, like the whitespace it
                // usually replaces (`<br>` between lines).
                pending_space = true;
            }
            _ if in_tag => {}
            c if c.is_whitespace() || c == '\u{00a0}' => pending_space = true,
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}

/// Normalize optional widget text; absent input yields the empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// True when the string is empty after trimming.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
