//! Text clean-up before speech synthesis
//!
//! Expands French abbreviations and verbalizes symbols so the speech engines
//! read them naturally.

use regex::Regex;
use std::sync::LazyLock;

static SPEECH_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bM\.", "Monsieur"),
        (r"\bMme\.", "Madame"),
        (r"\bMlle\.", "Mademoiselle"),
        (r"\bDr\.", "Docteur"),
        (r"\betc\.", "et cetera"),
        (r"\s*%", " pour cent"),
        (r"\s*€", " euros"),
        (r"\s*\$", " dollars"),
        (r":\)", " sourire"),
        (r":\(", " triste"),
        (r"\s+", " "),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| {
        Regex::new(pattern).ok().map(|re| (re, replacement))
    })
    .collect()
});

/// Rewrite `text` for speech
pub fn optimize_for_speech(text: &str) -> String {
    let mut optimized = text.to_string();
    for (pattern, replacement) in SPEECH_REWRITES.iter() {
        optimized = pattern.replace_all(&optimized, *replacement).into_owned();
    }
    optimized.trim().to_string()
}
