mod macros;

pub use macros::*;

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace. Umlauts are transliterated (`ü` -> `u`), which is
/// what WordPress does for `post_name` when the title has no slug.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        if ch.is_whitespace() || ch.is_control() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => need_dash = !output.is_empty(),
            }
        }
    }

    output
}

/// Returns `true` if `input` is likely to contain a template.
pub fn is_template(input: &str) -> bool {
    let mut slice = input.as_bytes();
    while let Some(i) = memchr::memchr(b'{', slice) {
        match slice.get(i + 1) {
            Some(b'{') | Some(b'%') => return true,
            Some(_) => slice = &slice[(i + 1)..],
            None => return false,
        }
    }

    false
}

/// Formats a phone number for a `tel:` link: keeps digits and a leading `+`.
pub fn tel_href(phone: &str) -> String {
    let mut href = String::from("tel:");
    for (i, c) in phone.trim().chars().enumerate() {
        match c {
            '+' if i == 0 => href.push(c),
            '0'..='9' => href.push(c),
            _ => {}
        }
    }

    href
}

/// A `tel:` link to `phone`. A templated number becomes a `tel` filter block
/// so that the link is derived when the template renders.
pub fn tel_link(phone: &str) -> String {
    match is_template(phone) {
        true => format!("{{% filter tel %}}{phone}{{% endfilter %}}"),
        false => tel_href(phone),
    }
}

/// A `mailto:` link to `email`, deferred like [`tel_link()`].
pub fn mailto_link(email: &str) -> String {
    match is_template(email) {
        true => format!("{{% filter mailto %}}{email}{{% endfilter %}}"),
        false => format!("mailto:{}", email.trim()),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }

    out
}

/// Escapes `text` for HTML and turns its line breaks into `<br>`.
pub fn html_lines(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// [`html_lines()`] of `text`, deferred like [`tel_link()`] when `text` is
/// templated so that substituted values are escaped too.
pub fn html_text(text: &str) -> String {
    match is_template(text) {
        true => format!("{{% filter html %}}{text}{{% endfilter %}}"),
        false => html_lines(text),
    }
}
