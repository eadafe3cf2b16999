//! Localized response strings.
//!
//! The catalog carries the exact strings shipped by the deployed skill for
//! English and German. Locale tags resolve by primary subtag; anything else
//! falls back to English.

use crate::models::ContentCategory;

/// Lines offered when no joke is ready to play yet.
const NO_JOKE_LINES_EN: [&str; 5] = [
    "Humor is not my strong skill.",
    "I'm too serious for jokes.",
    "I don't know any jokes.",
    "Ha-ha-ha...",
    "Russians are too serious to joke!",
];

const NO_JOKE_LINES_DE: [&str; 5] = [
    "Humor ist nicht meine Stärke.",
    "Ich bin zu ernst für Witze.",
    "Ich kenne keine Witze.",
    "Ha-ha-ha...",
    "Die Russen sind zu ernst, um Witze zu machen!",
];

/// Languages the skill can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
}

impl Language {
    /// Resolve a BCP 47 locale tag by its primary subtag.
    pub fn from_locale(locale: &str) -> Self {
        match locale.split('-').next() {
            Some("de") => Language::German,
            _ => Language::English,
        }
    }

    pub fn welcome(self) -> &'static str {
        match self {
            Language::English => {
                "Welcome, choose what kind of funny stuff do you prefer? Anecdotes, \
                 aphorisms, or adult jokes?"
            }
            Language::German => {
                "Willkommen, wähle aus, was für lustige Sachen du bevorzugst? Anekdoten, \
                 Aphorismen oder Witze für Erwachsene?"
            }
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Language::English => {
                "You can choose to receive anecdotes, aphorisms, or adult jokes. \
                 What do you prefer?"
            }
            Language::German => "Sie können mich grüßen! Wie kann ich helfen?",
        }
    }

    pub fn goodbye(self) -> &'static str {
        match self {
            Language::English => "Goodbye!",
            Language::German => "Auf Wiedersehen!",
        }
    }

    pub fn try_later(self) -> &'static str {
        match self {
            Language::English => "Sorry, I had trouble doing what you asked. Please try again.",
            Language::German => {
                "Tut mir leid, ich hatte Probleme, Ihre Anfrage zu erfüllen. \
                 Bitte versuche es erneut."
            }
        }
    }

    pub fn unknown_content_type(self) -> &'static str {
        match self {
            Language::English => {
                "I don't know anything about that. You can choose to receive anecdotes, \
                 aphorisms, or adult jokes. What do you prefer?"
            }
            Language::German => {
                "Ich weiß nichts darüber. Sie können wählen, ob Sie Anekdoten, Aphorismen \
                 oder Witze für Erwachsene erhalten möchten. Was bevorzugen Sie?"
            }
        }
    }

    /// Spoken name of a category.
    pub fn category_name(self, category: ContentCategory) -> &'static str {
        match (self, category) {
            (Language::English, ContentCategory::Anecdotes) => "anecdotes",
            (Language::English, ContentCategory::Aphorisms) => "aphorisms",
            (Language::English, ContentCategory::Adults) => "adult jokes",
            (Language::German, ContentCategory::Anecdotes) => "Anekdoten",
            (Language::German, ContentCategory::Aphorisms) => "Aphorismen",
            (Language::German, ContentCategory::Adults) => "Witze für Erwachsene",
        }
    }

    /// Confirmation spoken after a successful category switch.
    pub fn chosen_content_type(self, category: ContentCategory) -> String {
        let name = self.category_name(category);
        match self {
            Language::English => {
                format!("From this moment, I am going to tell you {}.", name)
            }
            Language::German => {
                format!("Von diesem Moment an werde ich Ihnen {} sagen.", name)
            }
        }
    }

    /// The five fallback lines for a turn with nothing playable.
    pub fn no_joke_lines(self) -> &'static [&'static str; 5] {
        match self {
            Language::English => &NO_JOKE_LINES_EN,
            Language::German => &NO_JOKE_LINES_DE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_resolution_by_primary_subtag() {
        assert_eq!(Language::from_locale("en-US"), Language::English);
        assert_eq!(Language::from_locale("en-GB"), Language::English);
        assert_eq!(Language::from_locale("de-DE"), Language::German);
        assert_eq!(Language::from_locale("de"), Language::German);
    }

    #[test]
    fn test_unsupported_locale_falls_back_to_english() {
        assert_eq!(Language::from_locale("fr-FR"), Language::English);
        assert_eq!(Language::from_locale(""), Language::English);
    }

    #[test]
    fn test_confirmation_names_the_category() {
        assert_eq!(
            Language::English.chosen_content_type(ContentCategory::Adults),
            "From this moment, I am going to tell you adult jokes."
        );
        assert_eq!(
            Language::German.chosen_content_type(ContentCategory::Aphorisms),
            "Von diesem Moment an werde ich Ihnen Aphorismen sagen."
        );
    }

    #[test]
    fn test_both_catalogs_offer_five_fallback_lines() {
        assert_eq!(Language::English.no_joke_lines().len(), 5);
        assert_eq!(Language::German.no_joke_lines().len(), 5);
    }
}
