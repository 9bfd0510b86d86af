use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A locale code in `ll_RR` form (`en_US`, `de_DE`, plain `en` is accepted).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '_')
            && !code.starts_with('_')
            && !code.ends_with('_');
        if !valid {
            return Err(CoreError::InvalidLocale(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Camel-case suffix used to build locale-qualified field keys:
    /// `en_US` -> `EnUs`. Each underscore-separated part is lowercased and
    /// capitalized.
    pub fn suffix(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for part in self.0.split('_') {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                for c in chars {
                    out.push(c.to_ascii_lowercase());
                }
            }
        }
        out
    }

    /// Locale-qualified variant of a base field key: `value` -> `valueEnUs`.
    pub fn variant_key(&self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global multilingual configuration: whether multilingual mode is on and
/// which locales are active, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSet {
    pub is_multilang_active: bool,
    pub input_language_list: Vec<Locale>,
}

impl LocaleSet {
    pub fn contains(&self, locale: &Locale) -> bool {
        self.input_language_list.contains(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_camel_cases_parts() {
        assert_eq!(Locale::parse("en_US").unwrap().suffix(), "EnUs");
        assert_eq!(Locale::parse("de_DE").unwrap().suffix(), "DeDe");
        assert_eq!(Locale::parse("fr").unwrap().suffix(), "Fr");
    }

    #[test]
    fn variant_key_appends_suffix() {
        let locale = Locale::parse("en_US").unwrap();
        assert_eq!(locale.variant_key("value"), "valueEnUs");
        assert_eq!(locale.variant_key("isInheritTeams"), "isInheritTeamsEnUs");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("_en").is_err());
        assert!(Locale::parse("en_").is_err());
        assert!(Locale::parse("en-US").is_err());
    }
}
