//! Glob Pattern Module
//!
//! Redis-style `KEYS` pattern matching for the in-process store, and escaping
//! for embedding literal text (entity ids) inside a pattern.

/// Characters with special meaning in a Redis glob pattern.
const SPECIAL: [char; 5] = ['*', '?', '[', ']', '\\'];

/// Escapes every glob metacharacter in `literal`.
pub fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Returns true if `text` matches `pattern`.
///
/// Supports `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and `\` escapes.
pub fn matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(p: &[char], t: &[char]) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some('*') => {
            let mut rest = &p[1..];
            while rest.first() == Some(&'*') {
                rest = &rest[1..];
            }
            if rest.is_empty() {
                return true;
            }
            (0..=t.len()).any(|i| match_from(rest, &t[i..]))
        }
        Some('?') => !t.is_empty() && match_from(&p[1..], &t[1..]),
        Some('[') => {
            let Some(&c) = t.first() else {
                return false;
            };
            match match_class(&p[1..], c) {
                Some((hit, consumed)) => hit && match_from(&p[1 + consumed..], &t[1..]),
                // unterminated class: treat '[' literally
                None => c == '[' && match_from(&p[1..], &t[1..]),
            }
        }
        Some('\\') if p.len() > 1 => !t.is_empty() && t[0] == p[1] && match_from(&p[2..], &t[1..]),
        Some(&c) => !t.is_empty() && t[0] == c && match_from(&p[1..], &t[1..]),
    }
}

/// Matches `c` against a class body (text after `[`).
///
/// Returns whether it matched and how many pattern chars the class used,
/// including the closing `]`, or `None` if the class is unterminated.
fn match_class(p: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 0;
    let negate = p.first() == Some(&'^');
    if negate {
        i += 1;
    }

    let mut hit = false;
    while i < p.len() {
        match p[i] {
            ']' => return Some((hit != negate, i + 1)),
            '\\' if i + 1 < p.len() => {
                hit |= p[i + 1] == c;
                i += 2;
            }
            lo if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' => {
                let hi = p[i + 2];
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                hit |= (lo..=hi).contains(&c);
                i += 3;
            }
            other => {
                hit |= other == c;
                i += 1;
            }
        }
    }
    None
}
