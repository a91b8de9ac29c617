//! Parser for the links and embeds found in Obsidian note bodies
//!
//! Supports:
//! - Wiki links: `[[Note]]`, `[[folder/Note|Alias]]`, `[[Note#Header]]`
//! - Wiki embeds: `![[image.png]]`
//! - Markdown links: `[text](folder/Note.md)`, `[text](<path with spaces.md>)`
//! - Markdown embeds: `![alt](assets/diagram%20one.png)`
//!
//! Targets come back as written, with fragment and alias stripped.
//! Markdown targets keep their percent-encoding; `LinkRef::syntax` tells the
//! caller which ones need decoding before resolution.

/// Which syntax a link was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSyntax {
    Wiki,
    Markdown,
}

/// A single link or embed occurrence in a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Raw link target without fragment or alias: "assets/image.png", "Note"
    pub link: String,
    /// Whether this is an embed (`![[...]]` or `![...](...)`)
    pub is_embed: bool,
    pub syntax: LinkSyntax,
}

/// Parse every link and embed in `content`, in document order.
///
/// Duplicates are kept. Fenced code blocks are skipped.
pub fn parse_links(content: &str) -> Vec<LinkRef> {
    let mut links = Vec::new();
    let mut in_fence = false;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        parse_line(line, &mut links);
    }

    links
}

fn parse_line(line: &str, links: &mut Vec<LinkRef>) {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let is_embed = chars[i] == '!' && i + 1 < len && chars[i + 1] == '[';
        let open = if is_embed { i + 1 } else { i };

        if chars[open] != '[' {
            i += 1;
            continue;
        }

        if open + 1 < len && chars[open + 1] == '[' {
            if let Some((link, end)) = parse_wiki_at(&chars, open, is_embed) {
                links.extend(link);
                i = end;
                continue;
            }
        } else if let Some((link, end)) = parse_markdown_at(&chars, open, is_embed) {
            links.extend(link);
            i = end;
            continue;
        }

        i = open + 1;
    }
}

/// Parse `[[...]]` starting at `start` (the first `[`).
///
/// Returns the link (None for same-note references like `[[#Header]]`) and
/// the position after the closing `]]`.
fn parse_wiki_at(chars: &[char], start: usize, is_embed: bool) -> Option<(Option<LinkRef>, usize)> {
    let content_start = start + 2;
    let mut i = content_start;

    while i + 1 < chars.len() {
        if chars[i] == ']' && chars[i + 1] == ']' {
            let inner: String = chars[content_start..i].iter().collect();
            return Some((wiki_link_from(&inner, is_embed), i + 2));
        }
        i += 1;
    }

    None
}

fn wiki_link_from(inner: &str, is_embed: bool) -> Option<LinkRef> {
    let target = inner.split_once('|').map_or(inner, |(target, _alias)| target);

    let link = strip_fragment(target).trim();
    if link.is_empty() {
        return None;
    }

    Some(LinkRef {
        link: link.to_string(),
        is_embed,
        syntax: LinkSyntax::Wiki,
    })
}

/// Parse `[text](target)` starting at `start` (the `[`).
fn parse_markdown_at(chars: &[char], start: usize, is_embed: bool) -> Option<(Option<LinkRef>, usize)> {
    let len = chars.len();

    // Find the `]` that closes the text, allowing one level of nested brackets
    let mut depth = 0;
    let mut close = None;
    for (offset, &c) in chars[start + 1..].iter().enumerate() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => {
                close = Some(start + 1 + offset);
                break;
            }
            ']' => depth -= 1,
            _ => {}
        }
    }
    let close = close?;

    if close + 1 >= len || chars[close + 1] != '(' {
        return None;
    }

    let target_start = close + 2;
    let (raw_target, end) = if chars.get(target_start) == Some(&'<') {
        let rel = chars[target_start + 1..].iter().position(|&c| c == '>')?;
        let target_end = target_start + 1 + rel;
        let paren = chars[target_end..].iter().position(|&c| c == ')')?;
        let target: String = chars[target_start + 1..target_end].iter().collect();
        (target, target_end + paren + 1)
    } else {
        let mut parens = 0;
        let mut j = target_start;
        loop {
            if j >= len {
                return None;
            }
            match chars[j] {
                '(' => parens += 1,
                ')' if parens == 0 => break,
                ')' => parens -= 1,
                _ => {}
            }
            j += 1;
        }
        let inside: String = chars[target_start..j].iter().collect();
        // Drop an optional title: [text](target "title")
        let target = match inside.find(" \"") {
            Some(pos) => inside[..pos].to_string(),
            None => inside,
        };
        (target, j + 1)
    };

    Some((markdown_link_from(&raw_target, is_embed), end))
}

fn markdown_link_from(raw_target: &str, is_embed: bool) -> Option<LinkRef> {
    let target = raw_target.trim();
    if is_external(target) {
        return None;
    }

    let link = strip_fragment(target).trim();
    if link.is_empty() {
        return None;
    }

    Some(LinkRef {
        link: link.to_string(),
        is_embed,
        syntax: LinkSyntax::Markdown,
    })
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

/// Drop `#Header` / `#^block` references.
fn strip_fragment(target: &str) -> &str {
    match target.find('#') {
        Some(pos) => &target[..pos],
        None => target,
    }
}
