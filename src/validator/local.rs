/// Characters never allowed in an unquoted local part atom.
fn is_specials(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | '(' | ')' | '[' | ']' | '\\' | '.' | ',' | ';' | ':' | '@' | '"'
    ) || is_ecma_space(c)
}

/// Whitespace as ECMAScript `\s` defines it. Differs from
/// `char::is_whitespace` on U+0085 (not space) and U+FEFF (space).
fn is_ecma_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Dot-separated atoms: no leading/trailing '.', no "..", no specials.
/// Non-ASCII characters are accepted as-is.
pub(crate) fn is_dot_atom(s: &str) -> bool {
    !s.is_empty()
        && s.split('.')
            .all(|atom| !atom.is_empty() && !atom.chars().any(is_specials))
}

/// `"` + at least one character + `"`, no line terminators inside.
pub(crate) fn is_quoted(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return false;
    };
    !inner.is_empty()
        && !inner
            .chars()
            .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
}

pub(crate) fn is_local_part(s: &str) -> bool {
    is_dot_atom(s) || is_quoted(s)
}
