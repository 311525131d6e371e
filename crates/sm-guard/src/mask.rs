//! Overlap-safe redaction of detected spans.
//!
//! Hits are applied right to left over the text's code points, so a splice
//! never shifts the offsets of hits still waiting to be applied.

use crate::detect::Hit;
use crate::error::{GuardError, Result};
use crate::luhn::digits_only;
use sm_common::{Category, MaskMode, RulePolicyMap, Warning};

/// Masked text plus the advisory warnings produced while masking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskOutcome {
    pub masked_text: String,
    pub warnings: Vec<Warning>,
}

/// Full-mode replacement token for a category.
pub fn placeholder(category: Category) -> &'static str {
    match category {
        Category::Name => "[NAME]",
        Category::Phone => "[PHONE]",
        Category::BankCard => "[BANK_CARD]",
        Category::Email => "[EMAIL]",
        Category::ApiKey => "[API_KEY]",
        Category::Custom => "[CUSTOM]",
    }
}

/// Keep `keep_start` leading and `keep_end` trailing characters, star the rest.
/// Values too short to keep anything are starred entirely.
fn mask_with_asterisks(value: &str, keep_start: usize, keep_end: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= keep_start + keep_end {
        return "*".repeat(len);
    }
    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..keep_start]);
    out.push_str(&"*".repeat(len - keep_start - keep_end));
    out.extend(&chars[len - keep_end..]);
    out
}

/// Write `masked_digits` back over the digits of `original`, left to right,
/// keeping every separator where it was.
fn replace_digits(original: &str, masked_digits: &str) -> String {
    let mut replacements = masked_digits.chars();
    original
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                replacements.next().unwrap_or('*')
            } else {
                c
            }
        })
        .collect()
}

fn mask_email(value: &str) -> String {
    let parts: Vec<&str> = value.split('@').collect();
    if parts.len() != 2 {
        return placeholder(Category::Email).to_string();
    }
    let (local, domain) = (parts[0], parts[1]);
    let safe_local = if local.chars().count() <= 2 {
        format!("{}*", local.chars().next().unwrap_or('*'))
    } else {
        mask_with_asterisks(local, 1, 1)
    };
    format!("{}@{}", safe_local, domain)
}

/// Category-specific partial reveal of a matched value.
pub fn partial_mask(category: Category, value: &str) -> String {
    match category {
        Category::Phone => replace_digits(value, &mask_with_asterisks(&digits_only(value), 3, 4)),
        Category::BankCard => {
            replace_digits(value, &mask_with_asterisks(&digits_only(value), 0, 4))
        }
        Category::Email => mask_email(value),
        Category::ApiKey => mask_with_asterisks(value, 4, 4),
        Category::Name => {
            let mut chars = value.chars();
            match chars.next() {
                Some(first) if value.chars().count() > 1 => {
                    format!("{}{}", first, "*".repeat(chars.count()))
                }
                _ => "*".to_string(),
            }
        }
        Category::Custom => mask_with_asterisks(value, 2, 2),
    }
}

/// Redact `hits` in `raw_text` according to each category's mask mode.
///
/// Hits with a missing or disabled policy, or in warn mode, leave the text
/// alone. A hit overlapping a span already redacted in this pass is skipped
/// with a `skip-overlap` warning; the rightmost hit wins.
pub fn mask(raw_text: &str, hits: &[Hit], policies: &RulePolicyMap) -> Result<MaskOutcome> {
    let original: Vec<char> = raw_text.chars().collect();
    let text_len = original.len();

    for hit in hits {
        if hit.end() > text_len {
            return Err(GuardError::SpanOutOfBounds {
                category: hit.category,
                start: hit.start,
                length: hit.length,
                text_len,
            });
        }
    }

    let mut ordered: Vec<&Hit> = hits.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start).then(b.length.cmp(&a.length)));

    let mut masked = original.clone();
    let mut redacted: Vec<(usize, usize)> = Vec::new();
    let mut warnings = Vec::new();

    for hit in ordered {
        let mode = match policies.get(hit.category) {
            Some(policy) if policy.enabled && policy.mask_mode != MaskMode::Warn => {
                policy.mask_mode
            }
            _ => continue,
        };

        if redacted.iter().any(|&(start, end)| hit.overlaps(start, end)) {
            warnings.push(Warning::SkipOverlap(hit.category));
            continue;
        }

        let value: String = original[hit.start..hit.end()].iter().collect();
        let replacement = match mode {
            MaskMode::Partial => partial_mask(hit.category, &value),
            MaskMode::Full | MaskMode::Warn => placeholder(hit.category).to_string(),
        };

        masked.splice(hit.start..hit.end(), replacement.chars());
        redacted.push((hit.start, hit.end()));
    }

    Ok(MaskOutcome {
        masked_text: masked.into_iter().collect(),
        warnings,
    })
}
