use super::geo::GeoExpectation;
use super::i18n::I18nTable;
use super::response::{DELAY_FIELD, MetaValue, ResponseMeta};
use crate::error::StoryError;
use crate::store::SaveStore;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What a step waits for before it lets the story move on.
#[derive(Clone, Default)]
pub enum Expectation {
    /// Nothing configured; never satisfied.
    #[default]
    None,
    /// Case-insensitive text, translated per language before comparing.
    Text(String),
    /// A location within a radius.
    Geo(GeoExpectation),
    /// Any text the save collaborator accepts.
    Save(Arc<dyn SaveStore>),
}

impl Expectation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Text(_) => "text",
            Self::Geo(_) => "geo",
            Self::Save(_) => "save",
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Geo(geo) => f.debug_tuple("Geo").field(geo).finish(),
            Self::Save(store) => f.debug_tuple("Save").field(&store.target()).finish(),
        }
    }
}

/// One node of a story: an expectation, its responses and its fail message.
///
/// Built fluently; setters can be called in any order. Setting two different
/// expectation kinds on the same step is recorded and reported by
/// [`Step::check`].
#[derive(Debug, Clone, Default)]
pub struct Step {
    expectation: Expectation,
    conflict: Option<(&'static str, &'static str)>,
    responses: Vec<String>,
    fail_message: String,
    meta: BTreeMap<usize, ResponseMeta>,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(self, text: impl Into<String>) -> Self {
        self.set_expectation(Expectation::Text(text.into()))
    }

    pub fn expect_geo(self, lat: f64, lon: f64, precision_m: f64) -> Self {
        self.set_expectation(Expectation::Geo(GeoExpectation::new(lat, lon, precision_m)))
    }

    pub fn expect_save(self, store: Arc<dyn SaveStore>) -> Self {
        self.set_expectation(Expectation::Save(store))
    }

    pub fn respond<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.fail_message = message.into();
        self
    }

    /// Attach a metadata field to the response at `index`.
    pub fn meta(mut self, index: usize, field: impl Into<String>, value: MetaValue) -> Self {
        self.meta.entry(index).or_default().insert(field, value);
        self
    }

    /// Deliver the response at `index` only after `delay`.
    pub fn later(self, index: usize, delay: Duration) -> Self {
        self.meta(index, DELAY_FIELD, MetaValue::Delay(delay))
    }

    fn set_expectation(mut self, expectation: Expectation) -> Self {
        let current = self.expectation.kind();
        if !matches!(self.expectation, Expectation::None)
            && current != expectation.kind()
            && self.conflict.is_none()
        {
            self.conflict = Some((current, expectation.kind()));
        }
        self.expectation = expectation;
        self
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    /// Literal expected text; the lookup key for commands and unordered steps.
    pub fn key(&self) -> Option<&str> {
        match &self.expectation {
            Expectation::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn fail_message(&self) -> &str {
        &self.fail_message
    }

    pub fn meta_for(&self, index: usize) -> ResponseMeta {
        self.meta.get(&index).cloned().unwrap_or_default()
    }

    /// Reject a step that was given two different expectation kinds.
    pub fn check(&self, label: impl fmt::Display) -> Result<(), StoryError> {
        match self.conflict {
            Some((first, second)) => Err(StoryError::ConflictingExpectation {
                step: label.to_string(),
                first,
                second,
            }),
            None => Ok(()),
        }
    }

    /// Whether `input` meets this step's expectation in `language`.
    ///
    /// A save expectation hands the raw input to its collaborator on every
    /// call, so callers evaluate a step at most once per message.
    pub fn is_satisfied_by(&self, input: &str, language: &str, i18n: &I18nTable) -> bool {
        match &self.expectation {
            Expectation::None => false,
            Expectation::Text(expected) => eq_ignore_case(i18n.line(expected, language), input),
            Expectation::Geo(geo) => geo.matches(input),
            Expectation::Save(store) => match store.save(input) {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(
                        store = %store.target(),
                        %error,
                        "save collaborator failed, answering with fail message"
                    );
                    false
                }
            },
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
