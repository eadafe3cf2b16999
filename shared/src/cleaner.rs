//! Noise stripping for raw provider text.
//!
//! The joke service mixes literal escape sequences, stray hyphens, and
//! punctuation runs into its payloads; some endpoints additionally wrap the
//! text in a one-field JSON object. The substitutions below run in a fixed
//! order before the text is handed to the synthesizer.

use std::sync::OnceLock;

use regex::Regex;

/// One substitution rule, applied in table order.
struct Replacement {
    pattern: Regex,
    replacement: &'static str,
}

fn replacements() -> &'static [Replacement] {
    static REPLACEMENTS: OnceLock<Vec<Replacement>> = OnceLock::new();
    REPLACEMENTS.get_or_init(|| {
        vec![
            // Escaped and literal line breaks become spaces.
            Replacement {
                pattern: Regex::new(r"(?:\\[rn]|[\r\n])").unwrap(),
                replacement: " ",
            },
            // Hyphens come through as dialogue dashes; drop them.
            Replacement {
                pattern: Regex::new(r"(-|- )").unwrap(),
                replacement: "",
            },
            Replacement {
                pattern: Regex::new(r"\.\.\.").unwrap(),
                replacement: ".",
            },
            // "!.." and "?.." collapse to the mark alone.
            Replacement {
                pattern: Regex::new(r"([!?])\.\.").unwrap(),
                replacement: "$1",
            },
            // Some endpoints wrap the joke in {"content":"..."}.
            Replacement {
                pattern: Regex::new(r#"\{"content":"(.*)"\}"#).unwrap(),
                replacement: "$1",
            },
        ]
    })
}

/// Strip provider punctuation artifacts and control characters from raw
/// joke text.
pub fn remove_noise_characters(input: &str) -> String {
    let mut text = input.to_string();
    for rule in replacements() {
        text = rule.pattern.replace_all(&text, rule.replacement).into_owned();
    }
    text
}
