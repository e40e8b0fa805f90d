//! PHP's `addslashes`/`stripslashes`.
//!
//! The WordPress importer passes every meta value through `wp_unslash`, so a
//! JSON string written verbatim would lose its backslashes on import.

/// Backslash-escapes `'`, `"`, `\` and NUL.
pub fn slash(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '\'' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }

    out
}

/// Removes one level of backslash escaping; `\0` becomes NUL.
pub fn unslash(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }

    out
}
