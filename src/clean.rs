use std::sync::LazyLock;

use regex::Regex;

// Page-break markers: two preceding newlines, [Page H123] or [[Page S123]],
// trailing whitespace.
static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n\[+Page\s[HS]\d+\]+\s").unwrap());

// Document header: "[Congressional Record Volume ..." through the first
// "[www.gpo.gov]", plus the newlines/whitespace right after it.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[Congressional\sRecord\sVolume.*?\[www\.gpo\.gov\]\n+\s+").unwrap()
});

// Formatting newline followed by a non-whitespace character: a continuation
// line, joined with no separator. The regex crate has no lookahead, so the
// captured character is re-emitted.
static SOFT_NEWLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(\S)").unwrap());

// Newline + exactly two spaces + uppercase letter: a new indented paragraph.
static PARA_NEWLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n {2}([A-Z])").unwrap());

/// Normalize the raw text of one Congressional Record section.
///
/// Steps run in a fixed order; each assumes the prior has already run:
/// 1. page-break markers become a single space,
/// 2. the header block is removed outright,
/// 3. soft newlines are joined to the previous line,
/// 4. paragraph-start newlines become newline + tab,
/// 5. the result is trimmed.
///
/// Total and idempotent: unmatched steps pass the text through unchanged,
/// and re-cleaning cleaned text is a no-op.
pub fn clean(raw: &str) -> String {
    let text = PAGE_RE.replace_all(raw, " ");
    let text = HEADER_RE.replace_all(&text, "");
    let text = SOFT_NEWLINE_RE.replace_all(&text, "$1");
    let text = PARA_NEWLINE_RE.replace_all(&text, "\n\t$1");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shaped like a real govinfo HTML rendition body.
    const RAW_SECTION: &str = "[Congressional Record Volume 167, Number 99 \
(Tuesday, June 8, 2021)]\n[Senate]\n[Pages S3967-S3968]\nFrom the Congressional \
Record Online through the Government Publishing Office [www.gpo.gov]\n\n\n  \
NOMINATION OF ZAHID N. QURAISHI\n\n  Mr. DURBIN. Mr. President, today the \
Senate will vote on the \nnomination of Judge Zahid Quraishi.\n\n[[Page S3968]]\n\n  \
The Senate confirmed the nomination by a wide margin.\n";

    #[test]
    fn page_marker_replaced_with_space() {
        assert_eq!(clean("foo\n\n[Page H123] bar"), "foo bar");
    }

    #[test]
    fn double_bracket_page_marker() {
        assert_eq!(clean("foo\n\n[[Page S45]] bar"), "foo bar");
    }

    #[test]
    fn header_block_removed() {
        let cleaned = clean(RAW_SECTION);
        assert!(cleaned.starts_with("NOMINATION OF ZAHID N. QURAISHI"));
        assert!(!cleaned.contains("www.gpo.gov"));
        assert!(!cleaned.contains("[Page"));
    }

    // Header removal consumes trailing whitespace, then the soft-newline pass
    // joins what remains with no separator.
    #[test]
    fn header_removal_boundary() {
        let out = clean("prefix\n[Congressional Record Volume 1 blah [www.gpo.gov]\n\n  Body");
        assert_eq!(out, "prefixBody");
    }

    #[test]
    fn soft_newline_joined_without_space() {
        assert_eq!(clean("A\nbravo"), "Abravo");
    }

    #[test]
    fn paragraph_newline_becomes_tab() {
        assert_eq!(clean("A\n  Bravo"), "A\n\tBravo");
    }

    #[test]
    fn lowercase_continuation_not_converted() {
        // Two spaces but no uppercase: left alone.
        assert_eq!(clean("A\n  bravo"), "A\n  bravo");
    }

    #[test]
    fn text_without_markers_passes_through() {
        assert_eq!(clean("plain text"), "plain text");
    }

    #[test]
    fn idempotent_on_cleaned_text() {
        let once = clean(RAW_SECTION);
        assert_eq!(clean(&once), once);

        for s in ["foo\n\n[Page H123] bar", "A\n  Bravo", "A\nbravo", ""] {
            let once = clean(s);
            assert_eq!(clean(&once), once);
        }
    }

    #[test]
    fn paragraph_structure_preserved() {
        let cleaned = clean(RAW_SECTION);
        // Each indented paragraph starts on its own tabbed line.
        assert!(cleaned.contains("\n\tMr. DURBIN. Mr. President"));
        assert!(cleaned.contains("\n\tThe Senate confirmed"));
        // Continuation lines were reflowed into their paragraph.
        assert!(cleaned.contains("vote on the nomination of Judge Zahid Quraishi."));
    }
}
