//! Story engine: a pure state machine turning (position, language, input)
//! into localized responses.

pub mod engine;
pub mod geo;
pub mod i18n;
pub mod loader;
pub mod reload;
pub mod response;
pub mod step;

pub use engine::{Resolution, Story};
pub use geo::{GeoExpectation, GeoPoint};
pub use i18n::{DEFAULT_LANGUAGE, I18nTable, LANGUAGE_CHANGED};
pub use loader::{load_story, load_story_file, load_story_with_i18n};
pub use reload::{StoryHandle, StorySource};
pub use response::{DELAY_FIELD, MetaValue, Response, ResponseMeta};
pub use step::{Expectation, Step};
