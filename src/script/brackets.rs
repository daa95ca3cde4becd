//! Bracket scanning for script text.

/// A top-level piece of bracketed text: either a whole `( ... )` group
/// (brackets included) or a bare token between groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chunk<'a> {
    Group(&'a str),
    Word(&'a str),
}

impl<'a> Chunk<'a> {
    pub(crate) fn text(&self) -> &'a str {
        match self {
            Chunk::Group(text) | Chunk::Word(text) => text,
        }
    }
}

/// Drop `;` comment lines and blank lines, and cut the text at the first `()`
/// terminator.
pub(crate) fn strip_script(script: &str) -> String {
    let kept: Vec<&str> = script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
        .collect();
    let joined = kept.join("\n");
    match regex!(r"\(\s*\)").find(&joined) {
        Some(end) => joined[..end.start()].trim().to_string(),
        None => joined.trim().to_string(),
    }
}

/// Split `text` into top-level groups and bare tokens.
///
/// On unbalanced brackets returns the byte offset where scanning gave up: the
/// stray `)` or the `(` that is never closed.
pub(crate) fn chunks(text: &str) -> Result<Vec<Chunk<'_>>, usize> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b if b.is_ascii_whitespace() => pos += 1,
            b')' => return Err(pos),
            b'(' => {
                let end = closing(bytes, pos).ok_or(pos)?;
                out.push(Chunk::Group(&text[pos..=end]));
                pos = end + 1;
            }
            _ => {
                let start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && !matches!(bytes[pos], b'(' | b')') {
                    pos += 1;
                }
                out.push(Chunk::Word(&text[start..pos]));
            }
        }
    }
    Ok(out)
}

/// Index of the `)` matching the `(` at `open`.
fn closing(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The text between a group's outer brackets, trimmed.
pub(crate) fn inner(group: &str) -> &str {
    group.strip_prefix('(').and_then(|g| g.strip_suffix(')')).unwrap_or(group).trim()
}
