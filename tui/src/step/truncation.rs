//! Guessing whether a finished response was cut off.
//!
//! A response that stops without closing punctuation, a closing code fence,
//! or a trailing emoji probably hit a length limit. The check is a heuristic
//! and only runs once generation has stopped.

use lazy_static::lazy_static;
use regex::Regex;

const ENDING_PUNCTUATION: [&str; 4] = [".", "?", "!", "```"];

lazy_static! {
    // ASCII digits, `#` and `*` carry the Emoji property for keycap
    // sequences; they do not end a sentence.
    static ref EMOJI_REGEX: Regex =
        Regex::new(r"[\p{Emoji}&&[^\x00-\x7F]]").unwrap_or_else(|_| std::process::abort());
}

/// Returns `true` when `content` looks like it ended mid-generation.
///
/// Always `false` while `generation_active`, and for empty content.
pub fn is_truncated(content: &str, generation_active: bool) -> bool {
    if generation_active {
        return false;
    }
    let content = content.trim();
    if content.is_empty() {
        return false;
    }
    let ends_with_punctuation = ENDING_PUNCTUATION.iter().any(|p| content.ends_with(p));
    !(ends_with_punctuation || ends_with_emoji(content))
}

/// Looks at the last two UTF-16 code units. An astral emoji followed by one
/// more character leaves only its low surrogate in the window, which never
/// matches.
fn ends_with_emoji(content: &str) -> bool {
    let all: Vec<u16> = content.encode_utf16().collect();
    let units = all[all.len().saturating_sub(2)..].to_vec();
    let tail: String = char::decode_utf16(units).filter_map(Result::ok).collect();
    EMOJI_REGEX.is_match(&tail)
}

/// Caches the truncation flag for the last `(content, generation_active)`
/// pair so callers can invoke [`TruncationTracker::update`] on every state
/// change without recomputing needlessly.
#[derive(Debug, Clone, Default)]
pub struct TruncationTracker {
    inputs: Option<(String, bool)>,
    truncated: bool,
}

impl TruncationTracker {
    /// Recomputes the flag if either input changed and returns it.
    pub fn update(&mut self, normalized_content: &str, generation_active: bool) -> bool {
        let unchanged = self
            .inputs
            .as_ref()
            .is_some_and(|(content, active)| {
                content == normalized_content && *active == generation_active
            });
        if !unchanged {
            self.truncated = is_truncated(normalized_content, generation_active);
            self.inputs = Some((normalized_content.to_string(), generation_active));
        }
        self.truncated
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}
