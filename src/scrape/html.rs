//! Minimal HTML element lookup for the course search pages
//!
//! The pages are server-rendered tables with predictable markup, so a full
//! DOM is unnecessary: elements are located by tag name with nesting-aware
//! matching of the close tag, and text content is the tag-stripped,
//! entity-decoded inner HTML.

/// Tags that never have a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// A located element. `inner` is everything between the open and close tags.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    open_tag: &'a str,
    inner: &'a str,
}

impl<'a> Element<'a> {
    /// Attribute value with entities decoded.
    pub fn attr(&self, name: &str) -> Option<String> {
        parse_attr(self.open_tag, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    /// Text content, entities decoded but whitespace left as is.
    pub fn text(&self) -> String {
        decode_entities(&strip_tags(self.inner, ""))
    }

    /// Descendants with the given tag, outermost matches only, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<Element<'a>> {
        find_all(self.inner, tag)
    }

    pub fn find_first(&self, tag: &str) -> Option<Element<'a>> {
        find_all(self.inner, tag).into_iter().next()
    }
}

/// Every outermost `<tag>` element in `html`.
pub fn find_all<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    let tag = tag.to_ascii_lowercase();
    let lower = html.to_ascii_lowercase();
    let is_void = VOID_TAGS.contains(&tag.as_str());

    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_open(&lower, &tag, pos) {
        let Some(open_end) = tag_end(html, start) else {
            break;
        };
        let open_tag = &html[start..open_end];

        if is_void || open_tag.ends_with("/>") {
            out.push(Element {
                open_tag,
                inner: "",
            });
            pos = open_end;
            continue;
        }

        let (inner_end, close_end) =
            find_matching_close(&lower, &tag, open_end).unwrap_or((html.len(), html.len()));
        out.push(Element {
            open_tag,
            inner: &html[open_end..inner_end],
        });
        pos = close_end;
    }
    out
}

/// First element with `tag` whose attribute `name` equals `value`.
pub fn find_by_attr<'a>(html: &'a str, tag: &str, name: &str, value: &str) -> Option<Element<'a>> {
    find_tagged(html, tag, |el| el.attr(name).as_deref() == Some(value))
}

/// First element with `tag` carrying CSS class `class`.
pub fn find_by_class<'a>(html: &'a str, tag: &str, class: &str) -> Option<Element<'a>> {
    find_tagged(html, tag, |el| el.has_class(class))
}

/// Like [`find_all`] but also searches inside elements that do not match,
/// so a matching table nested in a layout table is still found.
fn find_tagged<'a, F>(html: &'a str, tag: &str, pred: F) -> Option<Element<'a>>
where
    F: Fn(&Element<'a>) -> bool + Copy,
{
    for el in find_all(html, tag) {
        if pred(&el) {
            return Some(el);
        }
        if let Some(nested) = find_tagged(el.inner, tag, pred) {
            return Some(nested);
        }
    }
    None
}

/// Position of the next `<tag` open at or after `from` (in the lowercased text).
fn find_open(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", tag);
    let mut pos = from;
    while let Some(rel) = lower.get(pos..)?.find(&needle) {
        let start = pos + rel;
        let after = start + needle.len();
        match lower.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            None => return None,
            _ => pos = after,
        }
    }
    None
}

/// Position of the next `</tag` at or after `from`.
fn find_close(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("</{}", tag);
    let mut pos = from;
    while let Some(rel) = lower.get(pos..)?.find(&needle) {
        let start = pos + rel;
        let after = start + needle.len();
        match lower.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => return Some(start),
            None => return None,
            _ => pos = after,
        }
    }
    None
}

/// Index one past the `>` closing the tag that starts at `start`, honoring quotes.
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in html.as_bytes()[start..].iter().enumerate() {
        match (quote, *b) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(*b),
            (None, b'>') => return Some(start + i + 1),
            _ => {}
        }
    }
    None
}

/// `(start of close tag, end of close tag)` for the element opened before `from`.
fn find_matching_close(lower: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let next_close = find_close(lower, tag, pos)?;
        let next_open = find_open(lower, tag, pos).filter(|o| *o < next_close);
        match next_open {
            Some(open) => {
                depth += 1;
                pos = open + tag.len() + 1;
            }
            None => {
                depth -= 1;
                let close_end = lower[next_close..]
                    .find('>')
                    .map(|r| next_close + r + 1)
                    .unwrap_or(lower.len());
                if depth == 0 {
                    return Some((next_close, close_end));
                }
                pos = close_end;
            }
        }
    }
}

fn parse_attr(open_tag: &str, name: &str) -> Option<String> {
    let bytes = open_tag.as_bytes();
    let lower = open_tag.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let mut pos = 0;
    while let Some(rel) = lower.get(pos..)?.find(&name) {
        let start = pos + rel;
        let end = start + name.len();
        pos = end;

        let boundary_before = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !boundary_before {
            continue;
        }
        let rest = open_tag[end..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            if rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                || rest.is_empty()
            {
                // bare attribute
                return Some(String::new());
            }
            continue;
        };
        let rest = rest.trim_start();
        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &rest[1..];
                &body[..body.find(q).unwrap_or(body.len())]
            }
            _ => {
                let stop = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                &rest[..stop]
            }
        };
        return Some(decode_entities(value));
    }
    None
}

/// Remove tags, putting `sep` where each tag was.
pub fn strip_tags(s: &str, sep: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push_str(sep);
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the named entities the search pages use plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let Some(semi) = after.find(';').filter(|i| *i <= 10) else {
            out.push('&');
            rest = &after[1..];
            continue;
        };
        let entity = &after[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
