//! Text normalization and shape heuristics for heading detection.
//!
//! Run text is normalized once when it enters the pipeline (NFC, ligatures,
//! control and artifact characters). The shape predicates here are what the
//! feature extractor and title detector use to judge whether a piece of text
//! looks like a heading.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Result of normalizing a run's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Normalized text
    pub text: String,
    /// Whether undecodable or artifact characters had to be removed
    pub repaired: bool,
}

struct TextPatterns {
    numbering: Regex,
    labeled_numbering: Regex,
    page_furniture: Regex,
    dot_leader: Regex,
    leading_bullet: Regex,
}

impl TextPatterns {
    fn compile() -> Self {
        // All patterns are literals; a failure here is a programming error.
        let build = |pattern: &str| Regex::new(pattern).expect("literal regex");
        Self {
            numbering: build(
                r"^(?:\d{1,3}(?:\.\d{1,3})*\.?|[A-Za-z][.)]|[IVXLCDMivxlcdm]{1,6}[.)]|\(\s*(?:\d{1,3}|[A-Za-z]|[IVXivx]{1,5})\s*\)|\d{1,3}\))\s+\S",
            ),
            labeled_numbering: build(
                r"^\p{L}{2,20}\.?\s+(?:\d{1,3}(?:\.\d{1,3})*|[IVXLCDM]{1,6})(?:\s*[.:)\-–—](?:\s|$)|\s*$)",
            ),
            page_furniture: build(
                r"^(?:(?i:(?:page|p\.|pg\.?)\s*)?\d{1,4}(?:\s*(?i:of|/)\s*\d{1,4})?|[-–—]\s*\d{1,4}\s*[-–—]|[ivx]{1,5})$",
            ),
            dot_leader: build(r"\s*(?:\.\s*){4,}\d*\s*$"),
            leading_bullet: build(r"^[•·▪●○■□◦‣⁃]+\s*"),
        }
    }
}

fn patterns() -> &'static TextPatterns {
    static PATTERNS: OnceLock<TextPatterns> = OnceLock::new();
    PATTERNS.get_or_init(TextPatterns::compile)
}

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

const SENTENCE_END: [char; 6] = ['.', '!', '?', '。', '！', '？'];

const TRAILING_PUNCT: [char; 10] = ['.', '!', '?', ';', ',', '。', '！', '？', '；', '，'];

/// Normalize raw run text: NFC, ligature expansion, control characters to
/// spaces, and removal of U+FFFD, private-use glyphs and zero-width marks.
pub fn normalize_run_text(raw: &str) -> NormalizedText {
    let mut repaired = false;
    let mut text = String::with_capacity(raw.len());

    for c in raw.nfc() {
        if c == '\u{FFFD}' || is_private_use(c) {
            repaired = true;
        } else if let Some((_, expansion)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
            text.push_str(expansion);
        } else if is_invisible_format(c) {
            continue;
        } else if c.is_control() {
            text.push(' ');
        } else {
            text.push(c);
        }
    }

    NormalizedText { text, repaired }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Text decoded from raw fragment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded text
    pub text: String,
    /// Whether the bytes were neither UTF-16BE nor UTF-8 and were read as Latin-1
    pub fallback: bool,
}

/// Decode raw fragment bytes: UTF-16BE with BOM, then UTF-8, then Latin-1.
///
/// A dangling odd byte after UTF-16 code units decodes to U+FFFD, so it is
/// repaired and counted during normalization.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let chunks = bytes[2..].chunks_exact(2);
        let dangling = !chunks.remainder().is_empty();
        let utf16: Vec<u16> = chunks.map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        let mut text = String::from_utf16_lossy(&utf16);
        if dangling {
            text.push('\u{FFFD}');
        }
        return DecodedText {
            text,
            fallback: false,
        };
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: s.to_string(),
            fallback: false,
        };
    }

    log::debug!("Falling back to Latin-1 for {} bytes", bytes.len());
    DecodedText {
        text: bytes.iter().map(|&b| b as char).collect(),
        fallback: true,
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text as it should appear in the outline: whitespace collapsed, leading
/// bullet glyphs and trailing dot leaders removed.
pub fn clean_heading_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let p = patterns();
    let without_bullet = p.leading_bullet.replace(&collapsed, "");
    let without_leader = p.dot_leader.replace(&without_bullet, "");
    without_leader.trim().to_string()
}

/// Cut text to at most `max_chars` characters, preferring a word boundary.
pub fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(char::is_whitespace) {
        Some(pos) if cut[..pos].chars().count() > max_chars / 2 => cut[..pos].trim_end().to_string(),
        _ => cut.trim_end().to_string(),
    }
}

/// Whether two adjacent fragments should be joined without a space.
pub fn joins_without_space(left: &str, right: &str) -> bool {
    match (left.chars().last(), right.chars().next()) {
        (Some(l), Some(r)) => is_spaceless_script_char(l) && is_spaceless_script_char(r),
        _ => false,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Text with no letters or digits (rules, bullets, stray glyphs).
pub fn is_artifact(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

/// Page numbers and running page labels ("3", "Page 3 of 10", "- 3 -").
pub fn is_page_furniture(text: &str) -> bool {
    patterns().page_furniture.is_match(text.trim())
}

/// Whether the text opens with a structural numbering prefix
/// ("1.", "2.3.1", "A.", "IV.", "(3)", or a label word plus a numeral).
pub fn has_numbering_prefix(text: &str) -> bool {
    let text = text.trim_start();
    let p = patterns();
    p.numbering.is_match(text) || p.labeled_numbering.is_match(text)
}

/// Whether the text ends with sentence punctuation.
pub fn ends_with_sentence_punct(text: &str) -> bool {
    text.trim_end()
        .chars()
        .last()
        .is_some_and(|c| TRAILING_PUNCT.contains(&c))
}

/// Whether the text contains a sentence break before its last word.
///
/// Abbreviations and numbering ("Dr.", "U.S.", "1.", "A.") are not breaks.
pub fn has_multiple_sentences(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        let trimmed = text.trim();
        let inner: String = trimmed.chars().rev().skip(1).collect();
        return inner.contains(['。', '！', '？']);
    }

    words[..words.len() - 1].iter().any(|word| {
        let ends_sentence = word.chars().last().is_some_and(|c| SENTENCE_END.contains(&c));
        let letters = word.chars().filter(|c| c.is_alphabetic()).count();
        let fullwidth = word.chars().any(|c| matches!(c, '。' | '！' | '？'));
        fullwidth || (ends_sentence && letters >= 4)
    })
}

/// Score in `[0, 1]` for how heading-like the capitalization is.
///
/// Takes the larger of the uppercase-letter ratio and the ratio of
/// capitalized words. Text without cased letters scores 0.5.
pub fn capitalization_score(text: &str) -> f32 {
    let mut letters = 0usize;
    let mut upper = 0usize;
    let mut lower = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        if c.is_uppercase() {
            upper += 1;
        } else if c.is_lowercase() {
            lower += 1;
        }
    }

    if letters == 0 {
        return 0.0;
    }
    let cased = upper + lower;
    if cased == 0 {
        return 0.5;
    }
    let upper_ratio = upper as f32 / cased as f32;

    let mut counted = 0usize;
    let mut capitalized = 0usize;
    for word in text.split_whitespace() {
        let Some(first) = word.chars().find(|c| c.is_alphabetic()) else {
            continue;
        };
        if first.is_uppercase() {
            counted += 1;
            capitalized += 1;
        } else if first.is_lowercase() && word.chars().filter(|c| c.is_alphabetic()).count() > 3 {
            // Short lowercase words are connectives in title case
            counted += 1;
        }
    }
    let title_ratio = if counted > 0 {
        capitalized as f32 / counted as f32
    } else {
        0.0
    };

    upper_ratio.max(title_ratio)
}

/// 1.0 up to 60 characters, falling linearly to 0.0 at `max_chars`.
pub fn length_score(char_count: usize, max_chars: usize) -> f32 {
    const COMFORT: usize = 60;
    if char_count <= COMFORT {
        return 1.0;
    }
    if char_count >= max_chars || max_chars <= COMFORT {
        return 0.0;
    }
    1.0 - (char_count - COMFORT) as f32 / (max_chars - COMFORT) as f32
}

/// Whether the text could be a document title.
pub fn is_title_shaped(text: &str, min_chars: usize, max_chars: usize) -> bool {
    let visible = text.chars().filter(|c| !c.is_whitespace()).count();
    visible >= min_chars
        && text.chars().count() <= max_chars
        && !is_artifact(text)
        && !is_page_furniture(text)
        && !ends_with_sentence_punct(text)
        && !has_multiple_sentences(text)
}
