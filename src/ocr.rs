//! Rule-based OCR touch-ups and quality estimation.
//!
//! Nothing here needs a model: [`quick_fix_ocr`] applies a fixed sequence of
//! regex substitutions and [`calculate_ocr_confidence`] scores text by
//! counting suspicious patterns. The model-backed correction in
//! [`crate::assist`] falls back to these.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Characters and digraphs commonly confused by OCR engines.
pub const OCR_CONFUSIONS: &[(&str, &[&str])] = &[
    ("0", &["O", "o", "Q"]),
    ("O", &["0", "Q", "o"]),
    ("1", &["l", "I", "|", "i"]),
    ("l", &["1", "I", "|", "i"]),
    ("I", &["1", "l", "|"]),
    ("5", &["S", "s"]),
    ("S", &["5", "$"]),
    ("8", &["B", "&"]),
    ("B", &["8", "&"]),
    ("rn", &["m"]),
    ("vv", &["w"]),
    ("cl", &["d"]),
    ("cj", &["g"]),
];

/// Likely confusions for a glyph or digraph, empty when none are known.
pub fn confusions_for(glyph: &str) -> &'static [&'static str] {
    OCR_CONFUSIONS
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|(_, alts)| *alts)
        .unwrap_or(&[])
}

// ── Substitution rules (applied in order) ───────────────────────────────────

static WORD_FIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\btne\b", "the"),
        (r"\bTne\b", "The"),
        (r"\bvvith\b", "with"),
        (r"\bfrorn\b", "from"),
        (r"\bvvas\b", "was"),
    ]
    .into_iter()
    .map(|(p, r)| (Regex::new(p).unwrap(), r))
    .collect()
});

static RE_LETTER_O_IN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)[oO](\d+)\b").unwrap());
static RE_LEADING_I_IN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[Il](\d{2,})\b").unwrap());
static RE_SPACE_BEFORE_PERIOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\.").unwrap());
static RE_SPACE_BEFORE_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+,").unwrap());
static RE_DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static RE_CAMEL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Apply quick rule-based OCR corrections.
///
/// Rules, in order: common misread words, `O` inside digit runs, a leading
/// `I`/`l` before digits, whitespace before `.` and `,`, doubled commas,
/// doubled periods (longer runs are ellipses and stay), a space between a
/// lowercase and an uppercase letter, and whitespace runs collapsed to one
/// space.
pub fn quick_fix_ocr(text: &str) -> String {
    let mut s = text.to_string();
    for (re, replacement) in WORD_FIXES.iter() {
        s = re.replace_all(&s, *replacement).into_owned();
    }
    s = RE_LETTER_O_IN_NUMBER.replace_all(&s, "${1}0${2}").into_owned();
    s = RE_LEADING_I_IN_NUMBER.replace_all(&s, "1${1}").into_owned();
    s = RE_SPACE_BEFORE_PERIOD.replace_all(&s, ".").into_owned();
    s = RE_SPACE_BEFORE_COMMA.replace_all(&s, ",").into_owned();
    s = s.replace(",,", ",");
    s = RE_DOT_RUN
        .replace_all(&s, |caps: &Captures| {
            if caps[0].len() == 2 {
                ".".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
    s = RE_CAMEL_GAP.replace_all(&s, "$1 $2").into_owned();
    RE_WHITESPACE_RUN.replace_all(&s, " ").into_owned()
}

// ── Confidence estimation ────────────────────────────────────────────────────

static SUSPICIOUS_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\b[Il1]{2,}\b", "Ambiguous I/l/1 sequences"),
        (r"\b\w*[0O]{2,}\w*\b", "Ambiguous 0/O sequences"),
        (r"\brn\b", "Possible 'm' as 'rn'"),
        (r"\bvv\b", "Possible 'w' as 'vv'"),
        (r"[^\x00-\x7F]", "Non-ASCII characters"),
        (r"\s{3,}", "Unusual spacing"),
        (r"[A-Z]{10,}", "Long uppercase sequences"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

/// Overall quality band of OCR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    High,
    Medium,
    Low,
}

impl QualityLevel {
    fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.9 {
            QualityLevel::High
        } else if confidence > 0.7 {
            QualityLevel::Medium
        } else {
            QualityLevel::Low
        }
    }
}

/// One family of suspicious matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    /// Up to three matched snippets.
    pub examples: Vec<String>,
}

/// Estimated OCR quality of a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrQuality {
    /// 0–1, rounded to three decimals.
    pub confidence: f64,
    pub total_words: usize,
    pub potential_issues: usize,
    pub issues: Vec<OcrIssue>,
    pub quality: QualityLevel,
}

/// Estimate OCR quality from suspicious-pattern density.
///
/// Confidence is `1 - 2 * issues / words`, clamped to `[0, 1]`, and 0 for
/// text without words.
pub fn calculate_ocr_confidence(text: &str) -> OcrQuality {
    let total_words = text.split_whitespace().count();

    let mut issues = Vec::new();
    let mut issue_count = 0;
    for (re, description) in SUSPICIOUS_PATTERNS.iter() {
        let matches: Vec<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
        if matches.is_empty() {
            continue;
        }
        issue_count += matches.len();
        issues.push(OcrIssue {
            kind: description.to_string(),
            count: matches.len(),
            examples: matches.iter().take(3).map(|m| m.to_string()).collect(),
        });
    }

    let confidence = if total_words == 0 {
        0.0
    } else {
        let error_rate = issue_count as f64 / total_words as f64;
        (1.0 - error_rate * 2.0).clamp(0.0, 1.0)
    };
    let confidence = (confidence * 1000.0).round() / 1000.0;

    OcrQuality {
        confidence,
        total_words,
        potential_issues: issue_count,
        issues,
        quality: QualityLevel::from_confidence(confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_common_words() {
        assert_eq!(quick_fix_ocr("tne cat vvas here"), "the cat was here");
        assert_eq!(quick_fix_ocr("Tne end"), "The end");
        assert_eq!(quick_fix_ocr("frorn me vvith love"), "from me with love");
    }

    #[test]
    fn leaves_words_containing_patterns() {
        assert_eq!(quick_fix_ocr("atnet"), "atnet");
    }

    #[test]
    fn fixes_numbers() {
        assert_eq!(quick_fix_ocr("1O0 items"), "100 items");
        assert_eq!(quick_fix_ocr("page I23"), "page 123");
        assert_eq!(quick_fix_ocr("I2 stays"), "I2 stays");
    }

    #[test]
    fn fixes_punctuation() {
        assert_eq!(quick_fix_ocr("Hello , world ."), "Hello, world.");
        assert_eq!(quick_fix_ocr("a,,b"), "a,b");
        assert_eq!(quick_fix_ocr("Stop.. now"), "Stop. now");
        assert_eq!(quick_fix_ocr("Wait... what"), "Wait... what");
    }

    #[test]
    fn fixes_spacing() {
        assert_eq!(quick_fix_ocr("missingSpace"), "missing Space");
        assert_eq!(quick_fix_ocr("too   many\n\nspaces"), "too many spaces");
    }

    #[test]
    fn clean_text_is_unchanged() {
        let text = "The quick brown fox jumps over the lazy dog.";
        assert_eq!(quick_fix_ocr(text), text);
    }

    #[test]
    fn confidence_of_clean_text() {
        let q = calculate_ocr_confidence("hello world this is fine");
        assert_eq!(q.confidence, 1.0);
        assert_eq!(q.total_words, 5);
        assert_eq!(q.potential_issues, 0);
        assert!(q.issues.is_empty());
        assert_eq!(q.quality, QualityLevel::High);
    }

    #[test]
    fn confidence_of_empty_text() {
        let q = calculate_ocr_confidence("");
        assert_eq!(q.confidence, 0.0);
        assert_eq!(q.quality, QualityLevel::Low);
    }

    #[test]
    fn confidence_counts_issues() {
        // 10 words, one "rn" → 1 - 2 * 0.1 = 0.8
        let q = calculate_ocr_confidence("one two three four five six seven eight nine rn");
        assert_eq!(q.potential_issues, 1);
        assert_eq!(q.confidence, 0.8);
        assert_eq!(q.quality, QualityLevel::Medium);
        assert_eq!(q.issues[0].kind, "Possible 'm' as 'rn'");
        assert_eq!(q.issues[0].examples, vec!["rn"]);
    }

    #[test]
    fn confidence_is_clamped() {
        let q = calculate_ocr_confidence("rn rn vv");
        assert_eq!(q.confidence, 0.0);
        assert_eq!(q.quality, QualityLevel::Low);
    }

    #[test]
    fn examples_capped_at_three() {
        let q = calculate_ocr_confidence("é è ê ë words words words words words words");
        let non_ascii = q
            .issues
            .iter()
            .find(|i| i.kind == "Non-ASCII characters")
            .unwrap();
        assert_eq!(non_ascii.count, 4);
        assert_eq!(non_ascii.examples.len(), 3);
    }

    #[test]
    fn quality_serialises_lowercase() {
        let q = calculate_ocr_confidence("fine text");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["quality"], "high");
    }

    #[test]
    fn confusion_lookup() {
        assert_eq!(confusions_for("rn"), &["m"]);
        assert!(confusions_for("x").is_empty());
    }
}
