//! Section and list extraction from free-form completions.
//!
//! Sections are located by heading synonyms. A section runs until the next
//! heading of any known section, or until a blank line that is not followed
//! by more list items. A heading is either marked (markdown emphasis, `#`,
//! or a `label:` colon) or a bare line that is exactly the heading phrase, so
//! list items and prose that merely mention a heading word never end a
//! section.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::sections::all_synonym_groups;

/// A line whose heading part has more words than this is prose, not a heading.
const MAX_HEADING_WORDS: usize = 8;

/// Leading bullet or numbering token. `1.5 litres` is not a numbering token.
static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-•*–+]+\s*|\d+[.)](?:\s+|$))").unwrap());

/// Numbering, markdown heading, quote and emphasis markers before a heading.
static HEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[#>*_\s]|\d+[.)])+").unwrap());

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.)]\s").unwrap());

struct KnownHeading {
    synonym: &'static str,
    /// All synonyms of the section this one belongs to.
    group: &'static [&'static str],
    matcher: Regex,
}

/// Every known heading synonym, compiled once.
static KNOWN_HEADINGS: LazyLock<Vec<KnownHeading>> = LazyLock::new(|| {
    all_synonym_groups()
        .flat_map(|group| group.iter().map(move |synonym| (group, *synonym)))
        .filter_map(|(group, synonym)| {
            Regex::new(&synonym_pattern(synonym))
                .ok()
                .map(|matcher| KnownHeading {
                    synonym,
                    group,
                    matcher,
                })
        })
        .collect()
});

/// Build a case-insensitive matcher for one heading synonym.
///
/// The synonym must start on a word boundary. Latin synonyms must also end
/// on one (`dos` never matches `dosage`); Tamil synonyms may carry suffixes.
fn synonym_pattern(synonym: &str) -> String {
    let escaped = regex::escape(synonym)
        .replace('\'', "['’]")
        .replace(' ', r"\s+");
    let tail = if synonym.chars().last().is_some_and(|c| c.is_ascii()) {
        r"\b"
    } else {
        ""
    };
    format!(r"(?i)\b{escaped}{tail}")
}

struct HeadingLine<'a> {
    /// Heading text without markers and without anything after `:`.
    head: &'a str,
    /// Markdown heading or bold/italic wrapping.
    emphasized: bool,
    /// The head is followed by a `:`.
    labelled: bool,
    /// Starts with `N.` or `N)`.
    numbered: bool,
}

impl HeadingLine<'_> {
    /// Whether this line opens the section `matcher` names.
    ///
    /// Marked lines only need to contain the phrase (`**Brief Analysis**:`).
    /// Bare lines must be the phrase itself, optionally with a Tamil suffix,
    /// and never a numbered item.
    fn names(&self, matcher: &Regex) -> bool {
        let Some(m) = matcher.find(self.head) else {
            return false;
        };
        if self.emphasized || self.labelled {
            return true;
        }
        if self.numbered || m.start() != 0 {
            return false;
        }
        let rest = self.head[m.end()..].trim_end_matches(|c: char| c.is_ascii_punctuation());
        !rest.contains(char::is_whitespace)
    }
}

/// Classify a line as a possible heading. Bullet items and long prose lines
/// are never headings.
fn heading_line(line: &str) -> Option<HeadingLine<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_bullet_item(trimmed) {
        return None;
    }

    let body_start = HEADING_MARKERS.find(trimmed).map_or(0, |m| m.end());
    let prefix = &trimmed[..body_start];
    let body = &trimmed[body_start..];

    let (head_raw, labelled) = match body.find(':') {
        Some(idx) => (&body[..idx], true),
        None => (body, false),
    };
    let head = head_raw.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    if head.is_empty() || head.split_whitespace().count() > MAX_HEADING_WORDS {
        return None;
    }

    let emphasized = trimmed.starts_with('#')
        || prefix.contains(['*', '_'])
        || head_raw.contains("**")
        || head_raw.contains("__");
    let numbered = prefix.contains(|c: char| c.is_ascii_digit());

    Some(HeadingLine {
        head,
        emphasized,
        labelled,
        numbered,
    })
}

fn is_bullet_item(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '•' | '–' | '+') => true,
        Some('*') => chars.next().map_or(true, char::is_whitespace),
        _ => false,
    }
}

fn is_list_item(trimmed: &str) -> bool {
    is_bullet_item(trimmed) || NUMBERED_ITEM.is_match(trimmed)
}

/// The known section a line opens, unless it is one of `own_synonyms`.
fn foreign_heading(line: &str, own_synonyms: &[&str]) -> Option<&'static KnownHeading> {
    let heading = heading_line(line)?;
    KNOWN_HEADINGS
        .iter()
        .filter(|known| !own_synonyms.contains(&known.synonym))
        .find(|known| heading.names(&known.matcher))
}

/// Whether `trimmed` opens a different section than the one being read.
fn is_section_boundary(trimmed: &str, own_synonyms: &[&str]) -> bool {
    foreign_heading(trimmed, own_synonyms).is_some()
}

/// Content carried on the heading line itself: whatever follows the first
/// `:`, or the whole line when it is too long to be a heading.
fn first_line_content(first_line: &str) -> Option<&str> {
    let trimmed = first_line.trim();
    if let Some(idx) = trimmed.find(':') {
        let rest = trimmed[idx + 1..]
            .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
        return (!rest.is_empty()).then_some(rest);
    }
    (trimmed.split_whitespace().count() > MAX_HEADING_WORDS).then_some(trimmed)
}

/// Byte offset and text (without the newline) of every line.
fn line_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        spans.push((offset, line));
        offset += line.len() + 1;
    }
    spans
}

/// Locate the section introduced by one of `heading_synonyms`.
///
/// Synonyms are tried in order; for each, a heading-like line is preferred
/// over a mention inside prose. Returns the section text starting at its
/// heading, or `""` when no synonym occurs at all.
pub fn find_section<'a>(full_text: &'a str, heading_synonyms: &[&str]) -> &'a str {
    let matchers: Vec<Regex> = heading_synonyms
        .iter()
        .filter_map(|synonym| Regex::new(&synonym_pattern(synonym)).ok())
        .collect();
    let lines = line_spans(full_text);

    let on_heading_line = matchers.iter().find_map(|re| {
        lines
            .iter()
            .position(|(_, line)| heading_line(line).is_some_and(|heading| heading.names(re)))
    });

    let located = match on_heading_line {
        Some(idx) => Some((idx, lines[idx].0)),
        None => {
            // A mention inside another section's body belongs to that section.
            let claimed = claimed_spans(full_text, &lines, heading_synonyms);
            matchers.iter().find_map(|re| {
                re.find_iter(full_text)
                    .find(|m| !claimed.iter().any(|span| span.contains(&m.start())))
                    .and_then(|m| {
                        lines
                            .iter()
                            .rposition(|(offset, _)| *offset <= m.start())
                            .map(|idx| (idx, m.start()))
                    })
            })
        }
    };

    let Some((first_idx, start)) = located else {
        return "";
    };

    let end = section_end(full_text, &lines, first_idx, start, heading_synonyms);
    full_text[start..end].trim_end()
}

/// Byte ranges covered by sections other than the one named by
/// `own_synonyms`.
fn claimed_spans(
    text: &str,
    lines: &[(usize, &str)],
    own_synonyms: &[&str],
) -> Vec<Range<usize>> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, &(offset, line))| {
            let known = foreign_heading(line, own_synonyms)?;
            let end = section_end(text, lines, idx, offset, known.group);
            Some(offset..end.max(offset + line.len()) + 1)
        })
        .collect()
}

fn section_end(
    text: &str,
    lines: &[(usize, &str)],
    first_idx: usize,
    start: usize,
    own_synonyms: &[&str],
) -> usize {
    let (first_offset, first_line) = lines[first_idx];
    let mut end = first_offset + first_line.len();
    let mut seen_content = first_line_content(&text[start..end]).is_some();
    let mut pending_blank = false;

    for &(offset, line) in &lines[first_idx + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blank = seen_content;
            continue;
        }
        if is_section_boundary(trimmed, own_synonyms) {
            break;
        }
        if pending_blank && !is_list_item(trimmed) {
            break;
        }
        pending_blank = false;
        seen_content = true;
        end = offset + line.len();
    }

    end
}

/// Remove markdown emphasis markers.
fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

/// Clean one list line: emphasis, leading bullet/number token, whitespace.
pub fn clean_item(line: &str) -> String {
    let plain = strip_emphasis(line);
    BULLET_PREFIX.replace(&plain, "").trim().to_string()
}

/// Turn a section into its list items. The first line is the heading and is
/// discarded; lines that are empty after cleaning are dropped.
pub fn extract_items(section_text: &str) -> Vec<String> {
    section_text
        .lines()
        .skip(1)
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Turn a section into one paragraph: inline heading content plus every
/// following line, cleaned and joined with single spaces.
pub fn extract_paragraph(section_text: &str) -> String {
    let mut lines = section_text.lines();
    let mut parts: Vec<String> = Vec::new();

    if let Some(inline) = lines.next().and_then(first_line_content) {
        parts.push(clean_item(inline));
    }
    parts.extend(lines.map(clean_item));
    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

/// Section text with emphasis markers removed, for pattern matching.
pub(crate) fn plain_text(section_text: &str) -> String {
    strip_emphasis(section_text)
}
