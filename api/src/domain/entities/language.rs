//! Supported interface languages

use serde::{Deserialize, Serialize};

/// A language the platform is translated into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "French",
        }
    }

    /// Pick the language from an `Accept-Language` value.
    ///
    /// Only the first two characters are considered; anything unsupported
    /// falls back to the default.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        header
            .map(|value| value.trim().chars().take(2).collect::<String>())
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_language_uses_first_two_chars() {
        assert_eq!(
            Language::from_accept_language(Some("fr-CA,fr;q=0.9,en;q=0.8")),
            Language::Fr
        );
        assert_eq!(Language::from_accept_language(Some("FR")), Language::Fr);
    }

    #[test]
    fn accept_language_falls_back_to_default() {
        assert_eq!(Language::from_accept_language(Some("de-DE")), Language::En);
        assert_eq!(Language::from_accept_language(Some("")), Language::En);
        assert_eq!(Language::from_accept_language(None), Language::En);
    }

    #[test]
    fn codes_and_names() {
        assert_eq!(Language::Fr.code(), "fr");
        assert_eq!(Language::En.display_name(), "English");
        assert!("es".parse::<Language>().is_err());
    }
}
