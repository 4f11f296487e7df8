/// A run of text, marked when it matches the search query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

/// Split `text` around every ASCII-case-insensitive occurrence of `query`.
/// An empty query yields the whole text as one plain segment.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if query.is_empty() || text.is_empty() {
        return vec![Segment::Plain(text)];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let end = pos + query.len();
        let hit = text
            .get(pos..end)
            .map(|candidate| candidate.eq_ignore_ascii_case(query))
            .unwrap_or(false);

        if hit {
            if plain_start < pos {
                segments.push(Segment::Plain(&text[plain_start..pos]));
            }
            segments.push(Segment::Match(&text[pos..end]));
            pos = end;
            plain_start = end;
        } else {
            pos += text[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}
