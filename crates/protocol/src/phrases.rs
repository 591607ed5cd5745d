//! Shared caller vocabulary.
//!
//! Transcripts arrive from the platform with arbitrary casing, punctuation and
//! (for French callers) accents. Everything that matches on words goes through
//! [`normalize`] first so the classifier and the dialogue policy agree on what
//! a phrase is.

/// Closed set of phrases that end the call from any state.
///
/// A bare negation ("no", "non") is absent: mid-flow it means
/// "decline this offer", not "hang up".
pub const END_CALL_PHRASES: &[&str] = &[
    "goodbye",
    "good bye",
    "bye",
    "bye bye",
    "hang up",
    "end the call",
    "end call",
    "that's all",
    "that is all",
    "nothing else",
    "au revoir",
    "raccroche",
    "raccrocher",
    "vous pouvez raccrocher",
    "c'est tout",
    "rien d'autre",
    "bonne journee",
];

/// Lower-case, fold Latin accents, turn punctuation into spaces and collapse
/// runs of whitespace. Apostrophes are kept so "that's" stays one word.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'à' | 'â' | 'ä' | 'á' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ç' => 'c',
            '’' | '`' => '\'',
            c if c.is_alphanumeric() || c == '\'' || c == '@' || c == '.' => c,
            _ => ' ',
        };
        out.push(folded);
    }
    // Sentence dots are noise, but keep them inside tokens like e-mail addresses.
    out.split_whitespace()
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `phrase` occurs in the normalized `text` on word boundaries.
pub fn contains_phrase(normalized_text: &str, phrase: &str) -> bool {
    let haystack = format!(" {} ", normalized_text);
    let needle = format!(" {} ", normalize(phrase));
    haystack.contains(&needle)
}

/// True when the utterance contains any phrase from `phrases`.
pub fn matches_any(text: &str, phrases: &[&str]) -> bool {
    let norm = normalize(text);
    phrases.iter().any(|p| contains_phrase(&norm, p))
}

/// Explicit end-call phrase check against [`END_CALL_PHRASES`].
pub fn is_end_call(text: &str) -> bool {
    matches_any(text, END_CALL_PHRASES)
}
