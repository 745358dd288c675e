//! Transcript script detection by Unicode block scanning.

use super::Language;

/// What a transcript's characters reveal about its language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScriptDetection {
    /// A supported native script dominates the non-Latin characters.
    Native(Language),
    /// A recognized script outside the supported set (CJK, Cyrillic,
    /// Arabic); the caller must fall back to acoustic detection.
    Unsupported,
    /// No native script characters at all.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Devanagari,
    Tamil,
    Telugu,
    Kannada,
    Other,
}

fn classify_char(c: char) -> Option<Script> {
    match c as u32 {
        0x0900..=0x097F => Some(Script::Devanagari),
        0x0B80..=0x0BFF => Some(Script::Tamil),
        0x0C00..=0x0C7F => Some(Script::Telugu),
        0x0C80..=0x0CFF => Some(Script::Kannada),
        // CJK ideographs and kana.
        0x3040..=0x30FF | 0x4E00..=0x9FFF => Some(Script::Other),
        0x0400..=0x04FF => Some(Script::Other), // Cyrillic
        0x0600..=0x06FF => Some(Script::Other), // Arabic
        _ => None,
    }
}

/// Scan a transcript and report the dominant native script, if any.
pub(super) fn detect(text: &str) -> ScriptDetection {
    let mut counts = [0_usize; 4]; // Devanagari, Tamil, Telugu, Kannada
    let mut other = 0_usize;
    for c in text.chars() {
        match classify_char(c) {
            Some(Script::Devanagari) => counts[0] += 1,
            Some(Script::Tamil) => counts[1] += 1,
            Some(Script::Telugu) => counts[2] += 1,
            Some(Script::Kannada) => counts[3] += 1,
            Some(Script::Other) => other += 1,
            None => {}
        }
    }

    let supported: usize = counts.iter().sum();
    if supported == 0 {
        return if other > 0 {
            ScriptDetection::Unsupported
        } else {
            ScriptDetection::None
        };
    }
    if other > supported {
        return ScriptDetection::Unsupported;
    }

    let languages = [Language::Hi, Language::Ta, Language::Te, Language::Kn];
    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    ScriptDetection::Native(languages[best])
}
