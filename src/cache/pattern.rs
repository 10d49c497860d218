//! Glob Pattern Matching
//!
//! Redis `KEYS`-style globs used for bulk invalidation:
//! `*` any run, `?` any single char, `[abc]` / `[a-z]` / `[^a]` classes,
//! `\` escapes the next character.

/// Returns true when `key` matches `pattern` in full.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut pi, mut ki) = (0usize, 0usize);
    // Pattern index after the last `*` and the key index it is anchored at
    let mut backtrack: Option<(usize, usize)> = None;

    while ki < key.len() {
        if pi < pattern.len() && pattern[pi] == '*' {
            pi += 1;
            backtrack = Some((pi, ki));
            continue;
        }

        if pi < pattern.len() {
            if let Some(next) = match_token(&pattern, pi, key[ki]) {
                pi = next;
                ki += 1;
                continue;
            }
        }

        match backtrack {
            Some((star_pi, star_ki)) => {
                pi = star_pi;
                ki = star_ki + 1;
                backtrack = Some((star_pi, star_ki + 1));
            }
            None => return false,
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

/// Matches one non-star token at `pi` against `c`, returning the index of the
/// next token on success.
fn match_token(pattern: &[char], pi: usize, c: char) -> Option<usize> {
    match pattern[pi] {
        '?' => Some(pi + 1),
        '\\' if pi + 1 < pattern.len() => (pattern[pi + 1] == c).then_some(pi + 2),
        '[' => match match_class(pattern, pi, c) {
            Some((true, next)) => Some(next),
            Some((false, _)) => None,
            // Unterminated class: `[` is a literal
            None => (c == '[').then_some(pi + 1),
        },
        literal => (literal == c).then_some(pi + 1),
    }
}

/// Evaluates the class starting at `pattern[start] == '['`.
///
/// Returns whether `c` is in the class and the index after the closing `]`,
/// or None when the class is never closed.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = pattern.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < pattern.len() && pattern[i] != ']' {
        if pattern[i] == '\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
            let (lo, hi) = if pattern[i] <= pattern[i + 2] {
                (pattern[i], pattern[i + 2])
            } else {
                (pattern[i + 2], pattern[i])
            };
            matched |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            matched |= pattern[i] == c;
            i += 1;
        }
    }

    if i >= pattern.len() {
        return None;
    }
    Some((matched != negate, i + 1))
}
