//! Built-in sensitive data detection.
//!
//! One matcher per built-in [`Category`], each a pre-compiled regex plus a
//! post-match check. Matchers hold no mutable state and can run concurrently.
//!
//! Offsets on [`Hit`] are code point indices into the scanned text. Regex
//! matches are found on byte offsets and converted once per scan.

use crate::error::{GuardError, Result};
use crate::luhn::{digits_only, is_valid_luhn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sm_common::{Category, HitSummary, MaskMode, RiskLevel, RulePolicy, RulePolicyMap, Source};
use std::collections::BTreeMap;

/// Order in which matchers run. Only matters for ties after sorting.
const SCAN_ORDER: [Category; 5] = [
    Category::Phone,
    Category::Email,
    Category::BankCard,
    Category::ApiKey,
    Category::Name,
];

/// How the characters around a match are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Neither neighbour may be an ASCII digit.
    Digit,
    /// ASCII word boundary at both ends.
    Word,
}

/// Detection pattern definition.
struct DetectionPattern {
    pattern: Lazy<Regex>,
    boundary: Boundary,
}

// CN mobile, optional +86 prefix
static PHONE_PATTERN: DetectionPattern = DetectionPattern {
    pattern: Lazy::new(|| Regex::new(r"(?:\+?86[-\s]?)?1[3-9][0-9]{9}").unwrap()),
    boundary: Boundary::Digit,
};

static EMAIL_PATTERN: DetectionPattern = DetectionPattern {
    pattern: Lazy::new(|| {
        Regex::new(r"[A-Za-z0-9_][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
    }),
    boundary: Boundary::Word,
};

// sk- keys, AWS access key IDs, GitHub tokens
static API_KEY_PATTERNS: [DetectionPattern; 3] = [
    DetectionPattern {
        pattern: Lazy::new(|| {
            Regex::new(r"sk-(?:proj-|live-)?[A-Za-z0-9_-]{15,}[A-Za-z0-9_]").unwrap()
        }),
        boundary: Boundary::Word,
    },
    DetectionPattern {
        pattern: Lazy::new(|| Regex::new(r"AKIA[0-9A-Z]{16}").unwrap()),
        boundary: Boundary::Word,
    },
    DetectionPattern {
        pattern: Lazy::new(|| Regex::new(r"gh[pousr]_[A-Za-z0-9]{30,255}").unwrap()),
        boundary: Boundary::Word,
    },
];

// 13-19 digits, single space or hyphen allowed between digits
static BANK_CARD_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9](?:[ -]?[0-9]){12,18}").unwrap());

static CJK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:我叫|姓名[:：]?)\s*([\x{4e00}-\x{9fa5}]{2,4})").unwrap());

static LATIN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:my name is|name[:：]?)\s*([A-Z][a-z]{1,20}(?:\s[A-Z][a-z]{1,20}){0,2})")
        .unwrap()
});

/// A detected occurrence of sensitive data.
///
/// Hits are never edited in place; annotation builds new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub category: Category,
    pub source: Source,
    pub risk_level: RiskLevel,
    pub default_mask_mode: MaskMode,
    pub matched_text: String,
    /// Code point offset of the first matched character.
    pub start: usize,
    /// Length in code points.
    pub length: usize,
}

impl Hit {
    /// A built-in hit carrying the category's default severity and mask mode.
    pub fn builtin(category: Category, matched_text: &str, start: usize) -> Self {
        let defaults = RulePolicy::default_for(category);
        Self {
            category,
            source: Source::Builtin,
            risk_level: defaults.risk_level,
            default_mask_mode: defaults.mask_mode,
            matched_text: matched_text.to_string(),
            start,
            length: matched_text.chars().count(),
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Whether `[start, end)` intersects this hit's span.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        !(self.end() <= start || self.start >= end)
    }

    /// Copy of this hit with severity and mask mode taken from `policy`.
    pub fn with_policy(&self, policy: &RulePolicy) -> Self {
        Self {
            risk_level: policy.risk_level,
            default_mask_mode: policy.mask_mode,
            ..self.clone()
        }
    }

    /// Position-free projection exposed to callers.
    pub fn summary(&self) -> HitSummary {
        HitSummary {
            category: self.category,
            source: self.source,
            risk_level: self.risk_level,
        }
    }
}

/// Per-category enable flags for the detector. Absent categories are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledCategories(BTreeMap<Category, bool>);

impl EnabledCategories {
    /// Every built-in matcher enabled.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, enabled: bool) -> Self {
        self.0.insert(category, enabled);
        self
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.0.get(&category).copied().unwrap_or(true)
    }

    /// Flags for every built-in category, read from a policy map.
    ///
    /// Fails if any built-in category has no policy entry.
    pub fn from_policies(policies: &RulePolicyMap) -> Result<Self> {
        let mut flags = BTreeMap::new();
        for category in Category::BUILTIN {
            let policy = policies
                .get(category)
                .ok_or(GuardError::MissingPolicy(category))?;
            flags.insert(category, policy.enabled);
        }
        Ok(Self(flags))
    }
}

/// Byte offset to code point offset conversion for one text.
struct CharOffsets {
    starts: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        Self {
            starts: text.char_indices().map(|(b, _)| b).collect(),
        }
    }

    fn to_char(&self, byte: usize) -> usize {
        match self.starts.binary_search(&byte) {
            Ok(i) | Err(i) => i,
        }
    }
}

fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn char_before(text: &str, byte: usize) -> Option<char> {
    text[..byte].chars().next_back()
}

fn char_after(text: &str, byte: usize) -> Option<char> {
    text[byte..].chars().next()
}

fn has_digit_boundary(text: &str, start: usize, end: usize) -> bool {
    let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
    !is_digit(char_before(text, start)) && !is_digit(char_after(text, end))
}

/// ASCII word boundary at `byte`: word-ness differs on either side.
fn is_word_boundary(text: &str, byte: usize) -> bool {
    let before = char_before(text, byte).is_some_and(is_ascii_word);
    let after = char_after(text, byte).is_some_and(is_ascii_word);
    before != after
}

fn has_word_boundary(text: &str, start: usize, end: usize) -> bool {
    is_word_boundary(text, start) && is_word_boundary(text, end)
}

fn boundary_ok(boundary: Boundary, text: &str, start: usize, end: usize) -> bool {
    match boundary {
        Boundary::Digit => has_digit_boundary(text, start, end),
        Boundary::Word => has_word_boundary(text, start, end),
    }
}

fn push_pattern_matches(
    text: &str,
    offsets: &CharOffsets,
    pattern: &DetectionPattern,
    category: Category,
    output: &mut Vec<Hit>,
) {
    for m in pattern.pattern.find_iter(text) {
        if boundary_ok(pattern.boundary, text, m.start(), m.end()) {
            output.push(Hit::builtin(category, m.as_str(), offsets.to_char(m.start())));
        }
    }
}

fn push_bank_cards(text: &str, offsets: &CharOffsets, output: &mut Vec<Hit>) {
    for m in BANK_CARD_CANDIDATE.find_iter(text) {
        if has_digit_boundary(text, m.start(), m.end()) && is_valid_luhn(&digits_only(m.as_str()))
        {
            output.push(Hit::builtin(
                Category::BankCard,
                m.as_str(),
                offsets.to_char(m.start()),
            ));
        }
    }
}

/// Latest end inside `[start, end]` that sits on a word boundary, dropping
/// trailing captured words until one does.
fn latin_name_end(text: &str, start: usize, end: usize) -> Option<usize> {
    let mut end = end;
    loop {
        if is_word_boundary(text, end) {
            return Some(end);
        }
        let cut = text[start..end].rfind(char::is_whitespace)?;
        end = start + cut;
    }
}

fn push_names(text: &str, offsets: &CharOffsets, output: &mut Vec<Hit>) {
    for caps in CJK_NAME.captures_iter(text) {
        if let Some(name) = caps.get(1) {
            output.push(Hit::builtin(
                Category::Name,
                name.as_str(),
                offsets.to_char(name.start()),
            ));
        }
    }

    for caps in LATIN_NAME.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_word_boundary(text, whole.start()) {
            continue;
        }
        if let Some(end) = latin_name_end(text, name.start(), name.end()) {
            output.push(Hit::builtin(
                Category::Name,
                &text[name.start()..end],
                offsets.to_char(name.start()),
            ));
        }
    }
}

fn scan(category: Category, text: &str, offsets: &CharOffsets, output: &mut Vec<Hit>) {
    match category {
        Category::Phone => push_pattern_matches(text, offsets, &PHONE_PATTERN, category, output),
        Category::Email => push_pattern_matches(text, offsets, &EMAIL_PATTERN, category, output),
        Category::BankCard => push_bank_cards(text, offsets, output),
        Category::ApiKey => {
            for pattern in &API_KEY_PATTERNS {
                push_pattern_matches(text, offsets, pattern, category, output);
            }
        }
        Category::Name => push_names(text, offsets, output),
        // Policy-defined; the built-in detector never produces it.
        Category::Custom => {}
    }
}

/// Run every enabled built-in matcher over `text`.
///
/// Hits are sorted by start offset ascending, longer hits first on ties.
/// Overlaps between categories are left for masking to resolve.
pub fn detect(text: &str, enabled: &EnabledCategories) -> Vec<Hit> {
    let offsets = CharOffsets::new(text);
    let mut hits = Vec::new();

    for category in SCAN_ORDER {
        if enabled.is_enabled(category) {
            scan(category, text, &offsets, &mut hits);
        }
    }

    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.length.cmp(&a.length)));
    hits
}
