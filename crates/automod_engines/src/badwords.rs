#![forbid(unsafe_code)]

//! Blocked-word detection over the literal, leet and separator-stripped forms
//! of a message, plus the redaction used when the message is echoed to logs.

use regex::{Regex, RegexBuilder};

use automod_kernel_contracts::config::BadwordsRuleConfig;
use automod_kernel_contracts::violation::{Violation, ViolationKind};

use crate::normalize::{fold_compat, leet_to_plain, FoldMap, MatchForms, LEET_SUBSTITUTIONS};

pub mod reason_codes {
    use automod_kernel_contracts::ReasonCodeId;

    // Badword rule reason-code namespace.
    pub const AUTOMOD_BADWORD_PLAIN: ReasonCodeId = ReasonCodeId(0x414D_0401);
    pub const AUTOMOD_BADWORD_OBFUSCATED: ReasonCodeId = ReasonCodeId(0x414D_0402);
}

pub const CENSORED: &str = "[CENSORED]";
pub const LOG_CONTENT_MAX_CHARS: usize = 1_000;

#[derive(Debug, Clone)]
struct CompiledWord {
    canonical: String,
    pattern: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadwordHit {
    /// The configured word, lowercased. Never the surface form from the message.
    pub canonical: String,
    pub obfuscated: bool,
}

/// Word-boundary patterns for one revision of the configured word list.
#[derive(Debug, Clone, Default)]
pub struct BadwordMatcher {
    source: Vec<String>,
    compiled: Vec<CompiledWord>,
}

impl BadwordMatcher {
    pub fn compile(words: &[String]) -> Self {
        let mut compiled = Vec::with_capacity(words.len());
        for word in words {
            let canonical = word.trim().to_lowercase();
            if canonical.is_empty() {
                continue;
            }
            let pattern = format!(r"\b{}\b", regex::escape(&canonical));
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(pattern) => compiled.push(CompiledWord { canonical, pattern }),
                Err(err) => {
                    tracing::warn!(word = %canonical, %err, "skipping blocked word that does not compile")
                }
            }
        }
        Self {
            source: words.to_vec(),
            compiled,
        }
    }

    /// True when this matcher was built from exactly `words`.
    pub fn is_compiled_for(&self, words: &[String]) -> bool {
        self.source == words
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// First configured word found, in list order.
    pub fn find(&self, content: &str) -> Option<BadwordHit> {
        let forms = MatchForms::of(content);
        for word in &self.compiled {
            if forms.plain().iter().any(|f| word.pattern.is_match(f)) {
                return Some(BadwordHit {
                    canonical: word.canonical.clone(),
                    obfuscated: false,
                });
            }
            if forms.obfuscated().iter().any(|f| word.pattern.is_match(f)) {
                return Some(BadwordHit {
                    canonical: word.canonical.clone(),
                    obfuscated: true,
                });
            }
        }
        None
    }
}

pub fn evaluate_badwords(
    content: &str,
    config: &BadwordsRuleConfig,
    matcher: &BadwordMatcher,
) -> Option<Violation> {
    if !config.enabled || config.words.is_empty() {
        return None;
    }
    let hit = matcher.find(content)?;
    let (reason_code, reason) = if hit.obfuscated {
        (
            reason_codes::AUTOMOD_BADWORD_OBFUSCATED,
            "Contains prohibited content (obfuscated)",
        )
    } else {
        (
            reason_codes::AUTOMOD_BADWORD_PLAIN,
            "Contains prohibited content",
        )
    };
    Violation::v1(
        ViolationKind::Badword,
        reason_code,
        reason.to_string(),
        config.action,
        Some(hit.canonical),
        None,
    )
    .map_err(|err| tracing::warn!(%err, "badword violation failed contract validation"))
    .ok()
}

/// Replaces every occurrence of `word` with `[CENSORED]`. When the literal word is
/// absent, leet and separator variants of it are redacted instead. Matching runs
/// on the compatibility-folded text, so full-width and stylised spellings are
/// redacted too; text outside a match is kept as written.
pub fn censor(content: &str, word: &str) -> String {
    let word = fold_compat(word.trim());
    if word.is_empty() {
        return content.to_string();
    }
    let map = FoldMap::of(content);
    let Some(pattern) = redaction_pattern(&word, map.folded()) else {
        return content.to_string();
    };

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for found in pattern.find_iter(map.folded()) {
        let Some(span) = map.raw_range(found.range()) else {
            continue;
        };
        if span.start < cursor {
            continue;
        }
        out.push_str(&content[cursor..span.start]);
        out.push_str(CENSORED);
        cursor = span.end;
    }
    out.push_str(&content[cursor..]);
    out
}

fn redaction_pattern(word: &str, folded: &str) -> Option<Regex> {
    if let Ok(literal) = RegexBuilder::new(&regex::escape(word))
        .case_insensitive(true)
        .build()
    {
        if literal.is_match(folded) {
            return Some(literal);
        }
    }
    match RegexBuilder::new(&obfuscation_pattern(word))
        .case_insensitive(true)
        .build()
    {
        Ok(variant) => Some(variant),
        Err(err) => {
            tracing::warn!(%err, "could not build redaction pattern");
            None
        }
    }
}

fn obfuscation_pattern(word: &str) -> String {
    let parts: Vec<String> = word
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let plain = leet_to_plain(c.to_ascii_lowercase());
            let mut class = String::from("[");
            class.push_str(&regex::escape(&plain.to_string()));
            for (from, to) in LEET_SUBSTITUTIONS {
                if to == plain {
                    class.push_str(&regex::escape(&from.to_string()));
                }
            }
            class.push(']');
            class
        })
        .collect();
    parts.join(r"[\s_\-.|]*")
}

/// Caps echoed content at 1000 characters.
pub fn truncate_for_log(content: &str) -> String {
    content.chars().take(LOG_CONTENT_MAX_CHARS).collect()
}
