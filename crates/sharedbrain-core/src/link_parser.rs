#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{CaseFold, Identity};

    /// Link targets in `markdown`, ignoring code.
    fn extract_wikilinks(markdown: &str) -> Vec<String> {
        WikilinkScanner::new(markdown)
            .occurrences()
            .map(|occ| occ.target.to_string())
            .collect()
    }

    // === target extraction tests ===

    #[test]
    fn extracts_simple_wikilink() {
        let result = extract_wikilinks("[[Note]]");
        assert_eq!(result, vec!["Note"]);
    }

    #[test]
    fn returns_empty_for_no_links() {
        let result = extract_wikilinks("plain text");
        assert_eq!(result, Vec::<String>::new());
    }

    #[test]
    fn extracts_multiple_wikilinks() {
        let result = extract_wikilinks("[[One]] and [[Two]]");
        assert_eq!(result, vec!["One", "Two"]);
    }

    #[test]
    fn alias_targets_the_part_before_the_pipe() {
        let result = extract_wikilinks("[[Note|Display Text]]");
        assert_eq!(result, vec!["Note"]);
    }

    #[test]
    fn ignores_empty_brackets() {
        let result = extract_wikilinks("[[]] and [[   ]] and [[|alias]]");
        assert_eq!(result, Vec::<String>::new());
    }

    #[test]
    fn bare_extension_is_not_a_link() {
        assert_eq!(extract_wikilinks("[[.md]] and [[ .MD |alias]]"), Vec::<String>::new());
        assert_eq!(extract_wikilinks("[[notes.md]]"), vec!["notes.md"]);
    }

    #[test]
    fn ignores_links_in_code_blocks() {
        let markdown = "```\n[[CodeLink]]\n```\nOutside [[RealLink]]";
        let result = extract_wikilinks(markdown);
        assert_eq!(result, vec!["RealLink"]);
    }

    #[test]
    fn ignores_links_in_tilde_fences() {
        let markdown = "~~~text\n[[CodeLink]]\n~~~\n[[RealLink]]";
        assert_eq!(extract_wikilinks(markdown), vec!["RealLink"]);
    }

    #[test]
    fn ignores_links_in_inline_code() {
        let result = extract_wikilinks("See `[[Fake]]` but [[Real]]");
        assert_eq!(result, vec!["Real"]);
    }

    #[test]
    fn unbalanced_opening_is_not_a_link() {
        assert_eq!(extract_wikilinks("[[Broken and more text"), Vec::<String>::new());
        assert_eq!(extract_wikilinks("[[Outer [[Inner]]"), vec!["Inner"]);
        assert_eq!(extract_wikilinks("[[Half]"), Vec::<String>::new());
    }

    #[test]
    fn links_do_not_span_lines() {
        assert_eq!(extract_wikilinks("[[Split\nLink]]"), Vec::<String>::new());
    }

    // === WikilinkScanner tests ===

    #[test]
    fn captures_full_line_as_context() {
        let markdown = "\n* This is a line with no links\n* This is a line with a link to [[second]]\n";
        let scanner = WikilinkScanner::new(markdown);
        let found: Vec<_> = scanner.occurrences().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target, "second");
        assert_eq!(found[0].display, "second");
        assert_eq!(found[0].context, "* This is a line with a link to [[second]]");
    }

    #[test]
    fn context_drops_carriage_return() {
        let scanner = WikilinkScanner::new("see [[A]]\r\nnext");
        let found: Vec<_> = scanner.occurrences().collect();
        assert_eq!(found[0].context, "see [[A]]");
    }

    #[test]
    fn occurrences_are_in_source_order() {
        let markdown = "[[A]] then [[B]]\n[[C]]";
        let scanner = WikilinkScanner::new(markdown);
        let found: Vec<_> = scanner.occurrences().collect();
        let targets: Vec<_> = found.iter().map(|o| o.target).collect();
        assert_eq!(targets, vec!["A", "B", "C"]);
        assert_eq!(found[0].offset, 0);
        assert_eq!(found[1].offset, 11);
        assert_eq!(found[2].offset, 17);
    }

    #[test]
    fn alias_splits_display_and_target() {
        let scanner = WikilinkScanner::new("[[Foo Bar|the foo]]");
        let found: Vec<_> = scanner.occurrences().collect();
        assert_eq!(found[0].target, "Foo Bar");
        assert_eq!(found[0].display, "the foo");
    }

    #[test]
    fn scanning_is_restartable() {
        let scanner = WikilinkScanner::new("[[A]] [[B]]");
        let first: Vec<_> = scanner.occurrences().collect();
        let second: Vec<_> = scanner.occurrences().collect();
        assert_eq!(first, second);
    }

    // === scan_wikilinks tests ===

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, Identity, String)>,
    }

    impl LinkObserver for Recorder {
        fn link_with_context(&mut self, link: &WikilinkOccurrence<'_>, target: Identity) {
            self.seen
                .push((link.display.to_string(), target, link.context.to_string()));
        }
    }

    #[test]
    fn observer_receives_normalized_identity() {
        let mut recorder = Recorder::default();
        let count = scan_wikilinks("Links to [[Second]] and [[name with spaces]]", &CaseFold, &mut recorder);
        assert_eq!(count, 2);
        assert_eq!(recorder.seen[0].0, "Second");
        assert_eq!(recorder.seen[0].1.as_str(), "second.md");
        assert_eq!(recorder.seen[1].1.as_str(), "name with spaces.md");
        assert_eq!(recorder.seen[1].2, "Links to [[Second]] and [[name with spaces]]");
    }

    struct DashesAsSpaces;

    impl IdentityNormalizer for DashesAsSpaces {
        fn normalize(&self, reference: &str) -> Identity {
            crate::identity::normalize(&reference.replace('-', " "))
        }
    }

    #[test]
    fn normalizer_is_pluggable() {
        let mut recorder = Recorder::default();
        scan_wikilinks("[[name-with-dashes]]", &DashesAsSpaces, &mut recorder);
        assert_eq!(recorder.seen[0].1.as_str(), "name with dashes.md");
    }
}

use crate::identity::{remove_extension, Identity, IdentityNormalizer};
use regex::Regex;
use std::sync::LazyLock;

// Compile regex once, reuse across calls. Brackets and newlines are excluded
// from the inner text so an unbalanced `[[` never swallows a later link.
pub(crate) static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap()
});

static FENCED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n]*\n.*?```|~~~[^\n]*\n.*?~~~").unwrap()
});

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`[^`]*`").unwrap()
});

/// Split the inside of `[[...]]` into `(target, display)`.
///
/// `Target|Display` aliases the link text; otherwise both are the same.
/// Returns `None` for links whose target is empty once `.md` is dropped.
pub(crate) fn split_link_content(content: &str) -> Option<(&str, &str)> {
    let (target, display) = match content.split_once('|') {
        Some((target, display)) => (target.trim(), display.trim()),
        None => (content.trim(), content.trim()),
    };
    if remove_extension(target).is_empty() {
        return None;
    }
    let display = if display.is_empty() { target } else { display };
    Some((target, display))
}

/// A single `[[...]]` found in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikilinkOccurrence<'a> {
    /// Text shown for the link.
    pub display: &'a str,
    /// Reference to resolve, e.g. "Foo" from `[[Foo|Alias]]`.
    pub target: &'a str,
    /// The whole line the link sits on, without its line ending.
    pub context: &'a str,
    /// Byte offset of the opening `[[` in the document.
    pub offset: usize,
}

/// Build a set of byte ranges that are inside code blocks or inline code.
fn build_excluded_ranges(markdown: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    for m in FENCED_CODE_RE.find_iter(markdown) {
        ranges.push((m.start(), m.end()));
    }
    for m in INLINE_CODE_RE.find_iter(markdown) {
        ranges.push((m.start(), m.end()));
    }
    ranges
}

/// Returns true if the byte offset falls within any excluded range.
fn is_excluded(offset: usize, excluded: &[(usize, usize)]) -> bool {
    excluded.iter().any(|&(start, end)| offset >= start && offset < end)
}

/// Lines of `text` paired with the byte offset where each starts.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0usize, |offset, raw| {
        let start = *offset;
        *offset += raw.len();
        Some((start, raw.trim_end_matches(['\n', '\r'])))
    })
}

/// Finds wikilinks in one document.
///
/// Code ranges are computed once up front; [`occurrences`](Self::occurrences)
/// can then be walked lazily, as many times as needed.
pub struct WikilinkScanner<'a> {
    markdown: &'a str,
    excluded: Vec<(usize, usize)>,
}

impl<'a> WikilinkScanner<'a> {
    pub fn new(markdown: &'a str) -> Self {
        Self {
            markdown,
            excluded: build_excluded_ranges(markdown),
        }
    }

    /// Links left to right, top to bottom.
    pub fn occurrences(&self) -> impl Iterator<Item = WikilinkOccurrence<'a>> + '_ {
        let excluded = &self.excluded;
        lines_with_offsets(self.markdown).flat_map(move |(line_start, line)| {
            WIKILINK_RE.captures_iter(line).filter_map(move |cap| {
                let whole = cap.get(0)?;
                let offset = line_start + whole.start();
                if is_excluded(offset, excluded) {
                    return None;
                }
                let (target, display) = split_link_content(cap.get(1)?.as_str())?;
                Some(WikilinkOccurrence {
                    display,
                    target,
                    context: line,
                    offset,
                })
            })
        })
    }
}

/// Receives every link found by [`scan_wikilinks`].
pub trait LinkObserver {
    fn link_with_context(&mut self, link: &WikilinkOccurrence<'_>, target: Identity);
}

/// Walk all links in `markdown`, resolving each target through `normalizer`
/// and reporting it to `observer`. Returns the number of links seen.
pub fn scan_wikilinks<N, O>(markdown: &str, normalizer: &N, observer: &mut O) -> usize
where
    N: IdentityNormalizer + ?Sized,
    O: LinkObserver + ?Sized,
{
    let scanner = WikilinkScanner::new(markdown);
    let mut count = 0;
    for link in scanner.occurrences() {
        observer.link_with_context(&link, normalizer.normalize(link.target));
        count += 1;
    }
    count
}
