//! Heuristic intent detection for smart routing.
//!
//! A fixed ordered battery of pattern tests runs against the raw message;
//! several tags may fire at once, and a message that matches nothing is
//! tagged [`IntentTag::General`]. Cheap keyword triage is enough here: the
//! routing engine only uses the tags to order *already-credentialed*
//! providers, so a false positive merely shifts preference.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Semantic category detected in a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentTag {
    Math,
    Code,
    Research,
    Multilingual,
    Reasoning,
    Agentic,
    Uncensored,
    General,
}

impl std::fmt::Display for IntentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Math => "math",
            Self::Code => "code",
            Self::Research => "research",
            Self::Multilingual => "multilingual",
            Self::Reasoning => "reasoning",
            Self::Agentic => "agentic",
            Self::Uncensored => "uncensored",
            Self::General => "general",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Compiled patterns (Lazy statics)
// ---------------------------------------------------------------------------

static MATH_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(math|equation|calculate|derivative|integral|algebra|geometry|proof|theorem|formula)\b",
    ])
});

/// Arithmetic-looking character runs; only counted for messages long enough
/// that stray punctuation does not trip it.
static MATH_SYMBOLS: Lazy<Vec<Regex>> = Lazy::new(|| compile_patterns(&[r"[\d+\-*/^=()]+"]));

const MATH_SYMBOL_MIN_LEN: usize = 10;

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(code|function|class|api|debug|refactor|typescript|javascript|python|react|component)\b",
        r"```|const |function |import |export ",
    ])
});

static RESEARCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(research|study|paper|citation|source|evidence|according to|findings|data shows)\b",
        r"(?i)\b(latest|recent|current|2024|2025)\b",
    ])
});

static MULTILINGUAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"[\u{4e00}-\u{9fff}]",               // CJK unified ideographs
        r"[\u{3040}-\u{309f}\u{30a0}-\u{30ff}]", // hiragana + katakana
        r"[\u{ac00}-\u{d7af}]",               // hangul syllables
        r"[\u{0600}-\u{06ff}]",               // Arabic
        r"(?i)\b(translate|translation|multilingual|language)\b",
    ])
});

static REASONING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(explain|why|how does|reasoning|logic|analyze|compare|evaluate|pros and cons)\b",
    ])
});

static AGENTIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)\b(step by step|workflow|automate|agent|task|execute|run|schedule)\b",
    ])
});

static UNCENSORED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[r"(?i)\b(uncensored|controversial|opinion|debate|politics|religion)\b"])
});

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("Bad regex pattern `{p}`: {e}")))
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Detect the intents of a user message.
///
/// Pure and deterministic: the same input always yields the same tags, in
/// the same battery order. Never returns an empty set.
pub fn classify(message: &str) -> Vec<IntentTag> {
    let mut tags = Vec::new();

    if any_match(&MATH_KEYWORDS, message)
        || (any_match(&MATH_SYMBOLS, message) && message.chars().count() > MATH_SYMBOL_MIN_LEN)
    {
        tags.push(IntentTag::Math);
    }
    if any_match(&CODE_PATTERNS, message) {
        tags.push(IntentTag::Code);
    }
    if any_match(&RESEARCH_PATTERNS, message) {
        tags.push(IntentTag::Research);
    }
    if any_match(&MULTILINGUAL_PATTERNS, message) {
        tags.push(IntentTag::Multilingual);
    }
    if any_match(&REASONING_PATTERNS, message) {
        tags.push(IntentTag::Reasoning);
    }
    if any_match(&AGENTIC_PATTERNS, message) {
        tags.push(IntentTag::Agentic);
    }
    if any_match(&UNCENSORED_PATTERNS, message) {
        tags.push(IntentTag::Uncensored);
    }

    if tags.is_empty() {
        tags.push(IntentTag::General);
    }
    tags
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
