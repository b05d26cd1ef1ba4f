//! Pure placeholder substitution.
//!
//! Exactly five tokens are recognized: `{{name}}`, `{{organization}}`,
//! `{{position}}`, `{{email}}`, `{{phone}}`. Every occurrence is replaced
//! globally; a missing field substitutes the empty string; anything else in
//! `{{...}}` passes through verbatim.
//!
//! `apply` substitutes raw field values and is what the rasterizer uses
//! (its output is drawn as text, never parsed as markup). `apply_escaped`
//! HTML-escapes each field first and must be used wherever the result is
//! rendered as HTML, so recipient data can never inject markup.

use common::model::recipient::Recipient;

fn substitute(text: &str, recipient: &Recipient, escape: bool) -> String {
    let field = |value: &str| {
        if escape {
            html_escape(value)
        } else {
            value.to_string()
        }
    };
    text.replace("{{name}}", &field(&recipient.name))
        .replace("{{organization}}", &field(&recipient.organization))
        .replace("{{position}}", &field(&recipient.position))
        .replace("{{email}}", &field(&recipient.email))
        .replace("{{phone}}", &field(&recipient.phone))
}

/// Replace all recognized tokens with the recipient's raw field values.
pub fn apply(text: &str, recipient: &Recipient) -> String {
    substitute(text, recipient, false)
}

/// Replace all recognized tokens with HTML-escaped field values.
pub fn apply_escaped(text: &str, recipient: &Recipient) -> String {
    substitute(text, recipient, true)
}

pub fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
