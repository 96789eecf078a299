use super::i18n::{DEFAULT_LANGUAGE, I18nTable, LANGUAGE_CHANGED};
use super::response::Response;
use super::step::Step;
use crate::error::StoryError;
use std::collections::HashMap;

/// Outcome of resolving one message against a story.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub responses: Vec<Response>,
    pub language: String,
    pub should_advance: bool,
}

impl Resolution {
    pub fn texts(&self) -> Vec<&str> {
        self.responses.iter().map(Response::text).collect()
    }
}

/// A scripted conversation.
///
/// Ordered steps form the main flow and wrap around after the last one.
/// Commands (`/name`) and unordered steps (exact text) answer regardless of
/// position and never move it.
#[derive(Debug, Clone, Default)]
pub struct Story {
    steps: Vec<Step>,
    commands: HashMap<String, Step>,
    unordered: HashMap<String, Step>,
    i18n: I18nTable,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Register a command, keyed by the step's expected text without `/`.
    pub fn add_command(mut self, step: Step) -> Self {
        let name = step.key().unwrap_or_default().to_string();
        self.commands.insert(name, step);
        self
    }

    /// Register a step matched by its literal expected text at any position.
    pub fn add_unordered(mut self, step: Step) -> Self {
        let key = step.key().unwrap_or_default().to_string();
        self.unordered.insert(key, step);
        self
    }

    pub fn with_i18n(mut self, i18n: I18nTable) -> Self {
        self.i18n = i18n;
        self
    }

    /// Replace the whole translation table.
    pub fn set_i18n(&mut self, i18n: I18nTable) {
        self.i18n = i18n;
    }

    pub fn i18n(&self) -> &I18nTable {
        &self.i18n
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn command_names(&self) -> Vec<&str> {
        sorted_keys(&self.commands)
    }

    pub fn unordered_keys(&self) -> Vec<&str> {
        sorted_keys(&self.unordered)
    }

    /// Check every step for conflicting expectation kinds.
    pub fn validate(&self) -> Result<(), StoryError> {
        for (index, step) in self.steps.iter().enumerate() {
            step.check(format!("#{index}"))?;
        }
        for (name, step) in &self.commands {
            step.check(format!("/{name}"))?;
        }
        for (key, step) in &self.unordered {
            step.check(format!("{key:?}"))?;
        }
        Ok(())
    }

    /// Resolve `input` for a chat at `position` speaking `language`.
    ///
    /// An empty `language` means English. A wrong answer is not an error: it
    /// yields the step's fail message. Errors are configuration problems
    /// only, such as an empty main flow.
    pub fn resolve(
        &self,
        position: u64,
        language: &str,
        input: &str,
    ) -> Result<Resolution, StoryError> {
        let language = if language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            language
        };

        if let Some(command) = input.strip_prefix('/') {
            if command == DEFAULT_LANGUAGE || self.i18n.has_language(command) {
                return Ok(self.language_changed(command));
            }
            if let Some(step) = self.commands.get(command) {
                return Ok(self.render(step, language, false));
            }
        } else if let Some(step) = self.unordered.get(input) {
            return Ok(self.render(step, language, false));
        }

        if self.steps.is_empty() {
            return Err(StoryError::EmptyStory);
        }
        let index = usize::try_from(position % self.steps.len() as u64).unwrap_or_default();
        let step = &self.steps[index];
        step.check(format!("#{index}"))?;

        if step.is_satisfied_by(input, language, &self.i18n) {
            Ok(self.render(step, language, true))
        } else {
            let fail = step.fail_message();
            Ok(Resolution {
                responses: vec![Response::new(
                    fail,
                    self.i18n.line(fail, language),
                    language,
                    false,
                )],
                language: language.to_string(),
                should_advance: false,
            })
        }
    }

    fn language_changed(&self, language: &str) -> Resolution {
        Resolution {
            responses: vec![Response::new(
                LANGUAGE_CHANGED,
                self.i18n.line(LANGUAGE_CHANGED, language),
                language,
                false,
            )],
            language: language.to_string(),
            should_advance: false,
        }
    }

    fn render(&self, step: &Step, language: &str, should_advance: bool) -> Resolution {
        let responses = step
            .responses()
            .iter()
            .enumerate()
            .map(|(index, original)| {
                Response::new(
                    original.as_str(),
                    self.i18n.line(original, language),
                    language,
                    should_advance,
                )
                .with_meta(step.meta_for(index))
            })
            .collect();

        Resolution {
            responses,
            language: language.to_string(),
            should_advance,
        }
    }
}

fn sorted_keys(map: &HashMap<String, Step>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
