/// Trims the value and escapes the characters that carry meaning in HTML,
/// quotes included, so a stored value can be rendered verbatim.
pub fn sanitize(input: &str) -> String {
    escape_html(input.trim())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keeps ASCII digits and every `+`; everything else is dropped.
/// `"+375 (29) 123-45-67"` becomes `"+375291234567"`. Stray pluses survive so
/// the country-code check rejects inputs like `"++375..."`.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Length in characters, which is how every limit on the form is expressed.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
