//! Markup normalization for field values.
//!
//! Everything read out of a collection database passes through
//! [`normalize`] before it is shown, mapped, or stored. The rewrite is a
//! fixed sequence of steps; the order matters and is part of the contract.

use once_cell::sync::Lazy;
use regex::Regex;

static BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static P_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static P_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static SOUND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[sound:[^\]]*\]").unwrap());
static NEWLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*\n[ \t]*").unwrap());
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Strip markup from a field value, leaving plain text with at most one
/// blank line between paragraphs. Idempotent: a second pass is a no-op.
///
/// Steps, in order: line breaks become newlines; paragraph closes become
/// blank lines and paragraph opens vanish; the four common named entities
/// decode; any remaining tag collapses to a single space; bracketed audio
/// references vanish; CRLF becomes LF; whitespace touching a newline is
/// trimmed; blank-line runs collapse to one; space runs collapse to one;
/// the ends are trimmed.
pub fn normalize(input: &str) -> String {
    let text = BR.replace_all(input, "\n");
    let text = P_CLOSE.replace_all(&text, "\n\n");
    let text = P_OPEN.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    let text = TAG.replace_all(&text, " ");
    let text = SOUND.replace_all(&text, "");
    let text = text.replace("\r\n", "\n");
    let text = NEWLINE_WS.replace_all(&text, "\n");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    let text = SPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_breaks_become_newlines() {
        assert_eq!(normalize("one<br>two<br/>three<br />four"), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn paragraphs_become_blank_lines() {
        assert_eq!(normalize("<p>first</p><p>second</p>"), "first\n\nsecond");
        assert_eq!(normalize("<p class=\"x\">styled</p>"), "styled");
    }

    #[test]
    fn entities_decode() {
        // Decoded entities come before tag stripping, so an encoded tag
        // is stripped like a literal one.
        assert_eq!(normalize("a&nbsp;b &lt;i&gt; c &amp; d"), "a b c & d");
    }

    #[test]
    fn remaining_tags_collapse_to_a_space() {
        assert_eq!(normalize("a<b>bold</b>c"), "a bold c");
        assert_eq!(normalize("x<img src=\"pic.jpg\">y"), "x y");
    }

    #[test]
    fn sound_references_vanish() {
        assert_eq!(normalize("[sound:hello.mp3]bonjour"), "bonjour");
        assert_eq!(normalize("word [sound:a.ogg] [sound:b.ogg]"), "word");
    }

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(normalize("one\r\ntwo"), "one\ntwo");
    }

    #[test]
    fn blank_line_runs_collapse() {
        assert_eq!(normalize("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a  \n   \n  b"), "a\n\nb");
    }

    #[test]
    fn space_runs_collapse() {
        assert_eq!(normalize("a     b\tc"), "a b c");
    }

    #[test]
    fn trims_ends() {
        assert_eq!(normalize("  \n padded \n  "), "padded");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "<p>Hello&nbsp;<b>world</b></p><br>line two",
            "a<br>b<br/>c\r\nd",
            "[sound:x.mp3]front<hr>back",
            "plain text, already clean",
            "spaced     out\n\n\n\nlines",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
