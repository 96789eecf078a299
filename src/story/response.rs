use std::collections::BTreeMap;
use std::time::Duration;

/// Metadata field holding a delivery delay.
pub const DELAY_FIELD: &str = "time";

/// A single metadata value attached to one response of a step.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Delay(Duration),
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Per-response metadata: field name -> value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseMeta(BTreeMap<String, MetaValue>);

impl ResponseMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: MetaValue) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&MetaValue> {
        self.0.get(field)
    }

    /// Delivery delay, if the `time` field carries one.
    pub fn delay(&self) -> Option<Duration> {
        match self.0.get(DELAY_FIELD)? {
            MetaValue::Delay(delay) => Some(*delay),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }
}

/// One line produced by resolving a message against a story.
///
/// `original` is the untranslated key the text was rendered from; it is what
/// a later language switch re-translates.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    original: String,
    text: String,
    language: String,
    should_advance: bool,
    meta: ResponseMeta,
}

impl Response {
    pub fn new(
        original: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
        should_advance: bool,
    ) -> Self {
        Self {
            original: original.into(),
            text: text.into(),
            language: language.into(),
            should_advance,
            meta: ResponseMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn should_advance(&self) -> bool {
        self.should_advance
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    pub fn delay(&self) -> Option<Duration> {
        self.meta.delay()
    }
}
