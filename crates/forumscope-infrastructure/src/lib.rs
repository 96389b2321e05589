pub mod paths;
pub mod search;
pub mod settings;

pub use crate::search::DiscourseSearchClient;
pub use crate::settings::{ClientSettings, Settings, SettingsError, SettingsFile};
