use super::engine::Story;
use super::i18n::I18nTable;
use super::response::{DELAY_FIELD, MetaValue};
use super::step::Step;
use crate::error::StoryError;
use crate::store::FileStore;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GeoRecord {
    lat: f64,
    lon: f64,
    precision: f64,
}

/// One element of the story file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StepRecord {
    command: bool,
    unordered: bool,
    expect: Option<String>,
    expect_geo: Option<GeoRecord>,
    expect_save: Option<String>,
    response: Option<String>,
    responses: Option<Vec<String>>,
    fail: String,
    later: BTreeMap<usize, f64>,
    meta: BTreeMap<usize, BTreeMap<String, serde_json::Value>>,
}

impl StepRecord {
    fn into_step(self, index: usize) -> Result<(Step, Placement), StoryError> {
        let placement = match (self.command, self.unordered) {
            (true, true) => {
                return Err(load_error(index, "cannot be both a command and unordered"));
            }
            (true, false) => Placement::Command,
            (false, true) => Placement::Unordered,
            (false, false) => Placement::Ordered,
        };
        if placement != Placement::Ordered && self.expect.is_none() {
            return Err(load_error(index, "commands and unordered steps need \"expect\""));
        }

        let mut step = Step::new().fail(self.fail);
        if let Some(response) = self.response {
            step = step.respond([response]);
        } else if let Some(responses) = self.responses {
            step = step.respond(responses);
        }

        if let Some(text) = self.expect {
            step = step.expect(text);
        }
        if let Some(geo) = self.expect_geo {
            step = step.expect_geo(geo.lat, geo.lon, geo.precision);
        }
        if let Some(dir) = self.expect_save {
            step = step.expect_save(Arc::new(FileStore::new(dir)));
        }
        step.check(format!("#{index}"))?;

        for (response, seconds) in self.later {
            let delay = Duration::try_from_secs_f64(seconds).map_err(|_| {
                load_error(index, &format!("invalid \"later\" value {seconds} for response {response}"))
            })?;
            step = step.later(response, delay);
        }

        for (response, fields) in self.meta {
            for (field, value) in fields {
                let value = meta_value(&field, value).ok_or_else(|| {
                    load_error(index, &format!("unsupported meta value for field {field:?}"))
                })?;
                step = step.meta(response, field, value);
            }
        }

        Ok((step, placement))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Ordered,
    Command,
    Unordered,
}

fn meta_value(field: &str, value: serde_json::Value) -> Option<MetaValue> {
    use serde_json::Value;

    match value {
        Value::Number(number) if field == DELAY_FIELD => number
            .as_f64()
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            .map(MetaValue::Delay),
        Value::Number(number) => number.as_f64().map(MetaValue::Number),
        Value::String(text) => Some(MetaValue::Text(text)),
        Value::Bool(flag) => Some(MetaValue::Bool(flag)),
        _ => None,
    }
}

fn load_error(index: usize, message: &str) -> StoryError {
    StoryError::StoryLoad(format!("step #{index}: {message}"))
}

/// Build a story from a JSON array of step records.
///
/// ```json
/// [
///   {"command": true, "expect": "start", "response": "let's start"},
///   {"expect": "go to step 2", "response": "now at step 2", "fail": "still at step 1"},
///   {"expectGeo": {"lat": 43.257169, "lon": 76.924515, "precision": 50},
///    "response": "proper geo", "fail": "still waiting for geo"},
///   {"unordered": true, "expect": "hint", "responses": ["a", "b"], "later": {"1": 600}}
/// ]
/// ```
pub fn load_story<R: Read>(reader: R) -> Result<Story, StoryError> {
    let records: Vec<StepRecord> =
        serde_json::from_reader(reader).map_err(|e| StoryError::StoryLoad(e.to_string()))?;

    let mut story = Story::new();
    for (index, record) in records.into_iter().enumerate() {
        let (step, placement) = record.into_step(index)?;
        story = match placement {
            Placement::Ordered => story.add(step),
            Placement::Command => story.add_command(step),
            Placement::Unordered => story.add_unordered(step),
        };
    }
    Ok(story)
}

impl Story {
    pub fn from_json_str(source: &str) -> Result<Self, StoryError> {
        load_story(source.as_bytes())
    }
}

pub fn load_story_file(path: &Path) -> Result<Story, StoryError> {
    let file = std::fs::File::open(path)
        .map_err(|e| StoryError::StoryLoad(format!("cannot open {}: {e}", path.display())))?;
    load_story(std::io::BufReader::new(file))
}

/// Load a story file and, when given, its translation table.
pub fn load_story_with_i18n(
    story_path: &Path,
    i18n_path: Option<&Path>,
) -> Result<Story, StoryError> {
    let mut story = load_story_file(story_path)?;
    if let Some(path) = i18n_path {
        story.set_i18n(I18nTable::load(path)?);
    }
    tracing::debug!(
        path = %story_path.display(),
        steps = story.len(),
        languages = story.i18n().languages().len(),
        "story loaded"
    );
    Ok(story)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(save_dir: &Path) -> String {
        format!(
            r#"[
  {{"command": true, "expect": "start", "response": "let's start"}},
  {{"expect": "go to step 2", "response": "now at step 2", "fail": "still at step 1"}},
  {{"expectGeo": {{"lat": 43.257169, "lon": 76.924515, "precision": 50}},
    "response": "proper geo", "fail": "still waiting for geo"}},
  {{"expect": "finish", "response": "now finished", "fail": "still at step 2"}},
  {{"unordered": true, "expect": "unordered", "response": "out of order"}},
  {{"expect": "multi", "responses": ["one", "two", "three"], "later": {{"2": 600}},
    "meta": {{"0": {{"mood": "calm", "weight": 2, "loud": false}}}}, "fail": "not multi"}},
  {{"expectSave": {dir:?}, "response": "saved!", "fail": "not saved"}}
]"#,
            dir = save_dir.display().to_string()
        )
    }

    #[test]
    fn loads_every_kind_of_step() {
        let dir = TempDir::new().unwrap();
        let story = Story::from_json_str(&fixture(dir.path())).unwrap();

        assert_eq!(story.len(), 5);
        assert_eq!(story.command_names(), vec!["start"]);
        assert_eq!(story.unordered_keys(), vec!["unordered"]);

        let text = |position, input: &str| story.resolve(position, "", input).unwrap().texts()[0].to_string();
        assert_eq!(text(0, "help"), "still at step 1");
        assert_eq!(text(0, "go to step 2"), "now at step 2");
        assert_eq!(text(1, "43.257081,76.924835"), "proper geo");
        assert_eq!(text(2, "finish"), "now finished");
        assert_eq!(text(99, "/start"), "let's start");
        assert_eq!(text(66, "unordered"), "out of order");
    }

    #[test]
    fn multi_response_keeps_order_and_metadata() {
        let dir = TempDir::new().unwrap();
        let story = Story::from_json_str(&fixture(dir.path())).unwrap();

        let resolution = story.resolve(3, "", "multi").unwrap();
        assert_eq!(resolution.texts(), vec!["one", "two", "three"]);
        assert_eq!(resolution.responses[2].delay(), Some(Duration::from_secs(600)));

        let meta = resolution.responses[0].meta();
        assert_eq!(meta.get("mood"), Some(&MetaValue::Text("calm".into())));
        assert_eq!(meta.get("weight"), Some(&MetaValue::Number(2.0)));
        assert_eq!(meta.get("loud"), Some(&MetaValue::Bool(false)));
    }

    #[test]
    fn save_step_writes_into_configured_directory() {
        let dir = TempDir::new().unwrap();
        let story = Story::from_json_str(&fixture(dir.path())).unwrap();

        let resolution = story.resolve(4, "", "I want this saved").unwrap();
        assert_eq!(resolution.texts(), vec!["saved!"]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn fractional_later_seconds() {
        let story = Story::from_json_str(
            r#"[{"expect": "x", "responses": ["a", "b"], "later": {"1": 0.1}}]"#,
        )
        .unwrap();
        let resolution = story.resolve(0, "", "x").unwrap();
        assert_eq!(resolution.responses[1].delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn single_response_wins_over_list() {
        let story = Story::from_json_str(
            r#"[{"expect": "x", "response": "single", "responses": ["a", "b"]}]"#,
        )
        .unwrap();
        assert_eq!(story.resolve(0, "", "x").unwrap().texts(), vec!["single"]);
    }

    #[test]
    fn rejects_malformed_documents() {
        for source in [
            "",
            "{}",
            r#"[{"expect": 5}]"#,
            r#"[{"command": true, "unordered": true, "expect": "x"}]"#,
            r#"[{"command": true, "response": "no key"}]"#,
            r#"[{"expect": "x", "later": {"0": -1}}]"#,
            r#"[{"expect": "x", "meta": {"0": {"nested": [1, 2]}}}]"#,
        ] {
            let err = Story::from_json_str(source).unwrap_err();
            assert!(matches!(err, StoryError::StoryLoad(_)), "source {source:?}: {err}");
        }
    }

    #[test]
    fn rejects_conflicting_expectations() {
        let err = Story::from_json_str(
            r#"[{"expect": "x", "expectGeo": {"lat": 1, "lon": 2, "precision": 3}}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::ConflictingExpectation { .. }));
    }

    #[test]
    fn loads_story_and_translations_from_disk() {
        let dir = TempDir::new().unwrap();
        let story_path = dir.path().join("story.json");
        let i18n_path = dir.path().join("i18n.json");
        std::fs::write(&story_path, r#"[{"expect": "hi", "response": "hello", "fail": "?"}]"#).unwrap();
        std::fs::write(&i18n_path, r#"{"ru": {"hi": "привет", "hello": "здравствуй"}}"#).unwrap();

        let story = load_story_with_i18n(&story_path, Some(&i18n_path)).unwrap();
        assert_eq!(story.resolve(0, "ru", "Привет").unwrap().texts(), vec!["здравствуй"]);

        let err = load_story_with_i18n(&dir.path().join("missing.json"), None).unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }
}
