use super::response::Response;
use crate::error::StoryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Key of the synthetic line returned after a language switch.
pub const LANGUAGE_CHANGED: &str = "Language changed";

/// Language the story is written in; lines in it are their own keys.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Translation table: language -> (original line -> translated line).
///
/// Lookups never fail. An unknown language or an untranslated line yields
/// the original line unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct I18nTable(HashMap<String, HashMap<String, String>>);

impl I18nTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) a language with `original -> translated` pairs.
    pub fn with_language<I, K, V>(mut self, language: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.0.entry(language.to_string()).or_default();
        for (original, translated) in lines {
            table.insert(original.into(), translated.into());
        }
        self
    }

    pub fn from_json_str(source: &str) -> Result<Self, StoryError> {
        serde_json::from_str(source).map_err(|e| StoryError::I18nLoad(e.to_string()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoryError> {
        serde_json::from_reader(reader).map_err(|e| StoryError::I18nLoad(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, StoryError> {
        let file = std::fs::File::open(path).map_err(|e| {
            StoryError::I18nLoad(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Translated `key` for `language`, or `key` itself.
    pub fn line<'a>(&'a self, key: &'a str, language: &str) -> &'a str {
        self.0
            .get(language)
            .and_then(|lines| lines.get(key))
            .map_or(key, String::as_str)
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.0.contains_key(language)
    }

    /// Known languages, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.0.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Re-render already resolved responses in `language`, starting from each
    /// response's original key. Advance flags and metadata are kept.
    pub fn translate_all(&self, responses: &[Response], language: &str) -> Vec<Response> {
        responses
            .iter()
            .map(|response| {
                Response::new(
                    response.original(),
                    self.line(response.original(), language),
                    language,
                    response.should_advance(),
                )
                .with_meta(response.meta().clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::response::{DELAY_FIELD, MetaValue, ResponseMeta};
    use std::time::Duration;

    fn table() -> I18nTable {
        I18nTable::new()
            .with_language("ru", [("one", "один"), ("two", "два")])
            .with_language("kk", [("one", "бір")])
    }

    #[test]
    fn line_falls_back_to_original() {
        let i18n = table();
        assert_eq!(i18n.line("one", "ru"), "один");
        assert_eq!(i18n.line("three", "ru"), "three");
        assert_eq!(i18n.line("one", "de"), "one");
        assert_eq!(i18n.line("one", ""), "one");
    }

    #[test]
    fn languages_are_sorted() {
        assert_eq!(table().languages(), vec!["kk", "ru"]);
        assert!(table().has_language("kk"));
        assert!(!table().has_language("en"));
    }

    #[test]
    fn translate_all_uses_original_keys() {
        let i18n = table();
        let mut meta = ResponseMeta::new();
        meta.insert(DELAY_FIELD, MetaValue::Delay(Duration::from_secs(2)));
        let responses = vec![
            Response::new("one", "бір", "kk", true).with_meta(meta.clone()),
            Response::new("two", "two", "kk", true),
        ];

        let translated = i18n.translate_all(&responses, "ru");

        assert_eq!(translated[0].text(), "один");
        assert_eq!(translated[1].text(), "два");
        assert_eq!(translated[0].original(), "one");
        assert!(translated.iter().all(|r| r.language() == "ru"));
        assert!(translated.iter().all(Response::should_advance));
        assert_eq!(translated[0].meta(), &meta);
    }

    #[test]
    fn loads_two_level_json() {
        let i18n = I18nTable::from_json_str(r#"{"ru": {"Language changed": "Язык изменен"}}"#)
            .unwrap();
        assert_eq!(i18n.line(LANGUAGE_CHANGED, "ru"), "Язык изменен");
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        for source in ["", "[]", r#"{"ru": ["not", "a", "map"]}"#, r#"{"ru": {"a": 1}}"#] {
            let err = I18nTable::from_json_str(source).unwrap_err();
            assert!(matches!(err, StoryError::I18nLoad(_)), "source {source:?}");
        }
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = I18nTable::load(Path::new("/nonexistent/i18n.json")).unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }
}
