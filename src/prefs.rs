//! Board UI preferences stored next to the tasks.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::storage::{CorruptStatePolicy, ACTIVE_BOARD_KEY, LIGHT_THEME_KEY, SHOW_SIDEBAR_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn stored_value(self) -> &'static str {
        match self {
            Theme::Light => "enabled",
            Theme::Dark => "disabled",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "invalid theme '{}': must be light or dark",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preferences<S> {
    store: S,
    policy: CorruptStatePolicy,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: CorruptStatePolicy::default(),
        }
    }

    /// How an unreadable store is handled. Under `Reset` every preference
    /// reads as unset; under `Surface` reads and writes fail.
    pub fn with_policy(mut self, policy: CorruptStatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sidebar is shown only when the stored flag is exactly `"true"`.
    pub fn show_sidebar(&self) -> Result<bool> {
        Ok(self.read(SHOW_SIDEBAR_KEY)?.as_deref() == Some("true"))
    }

    pub fn set_show_sidebar(&self, show: bool) -> Result<()> {
        self.write(SHOW_SIDEBAR_KEY, if show { "true" } else { "false" })
    }

    /// Last selected board. Stored as a JSON string; anything else reads as
    /// no selection.
    pub fn active_board(&self) -> Result<Option<String>> {
        let Some(raw) = self.read(ACTIVE_BOARD_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Option<String>>(&raw) {
            Ok(board) => Ok(board.filter(|board| !board.is_empty())),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable {ACTIVE_BOARD_KEY}");
                Ok(None)
            }
        }
    }

    pub fn set_active_board(&self, board: &str) -> Result<()> {
        let json = serde_json::to_string(board)?;
        self.write(ACTIVE_BOARD_KEY, &json)
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(match self.read(LIGHT_THEME_KEY)?.as_deref() {
            Some("enabled") => Theme::Light,
            _ => Theme::Dark,
        })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.write(LIGHT_THEME_KEY, theme.stored_value())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.store.get_item(key) {
            Err(Error::CorruptState(reason)) if self.policy == CorruptStatePolicy::Reset => {
                tracing::warn!(%reason, key, "store unreadable, preference treated as unset");
                Ok(None)
            }
            other => other,
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.policy == CorruptStatePolicy::Surface {
            // a write would replace an unreadable store
            self.store.get_item(key)?;
        }
        self.store.set_item(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn defaults_when_unset() {
        let prefs = Preferences::new(MemoryStore::new());
        assert!(!prefs.show_sidebar().unwrap());
        assert_eq!(prefs.active_board().unwrap(), None);
        assert_eq!(prefs.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn sidebar_flag_round_trips_as_text() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());

        prefs.set_show_sidebar(true).unwrap();
        assert_eq!(store.get_item(SHOW_SIDEBAR_KEY).unwrap().as_deref(), Some("true"));
        assert!(prefs.show_sidebar().unwrap());

        prefs.set_show_sidebar(false).unwrap();
        assert_eq!(store.get_item(SHOW_SIDEBAR_KEY).unwrap().as_deref(), Some("false"));
        assert!(!prefs.show_sidebar().unwrap());
    }

    #[test]
    fn active_board_is_json_encoded() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());

        prefs.set_active_board("Home").unwrap();
        assert_eq!(
            store.get_item(ACTIVE_BOARD_KEY).unwrap().as_deref(),
            Some("\"Home\"")
        );
        assert_eq!(prefs.active_board().unwrap().as_deref(), Some("Home"));
    }

    #[test]
    fn unreadable_active_board_is_ignored() {
        let store = MemoryStore::new();
        store.set_item(ACTIVE_BOARD_KEY, "Home").unwrap();
        let prefs = Preferences::new(store.clone());
        assert_eq!(prefs.active_board().unwrap(), None);

        store.set_item(ACTIVE_BOARD_KEY, "null").unwrap();
        assert_eq!(prefs.active_board().unwrap(), None);
    }

    #[test]
    fn theme_uses_enabled_disabled() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(store.clone());

        prefs.set_theme(Theme::Light).unwrap();
        assert_eq!(store.get_item(LIGHT_THEME_KEY).unwrap().as_deref(), Some("enabled"));
        assert_eq!(prefs.theme().unwrap(), Theme::Light);

        prefs.set_theme(Theme::Light.toggled()).unwrap();
        assert_eq!(store.get_item(LIGHT_THEME_KEY).unwrap().as_deref(), Some("disabled"));
        assert_eq!(prefs.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn unreadable_store_reads_as_unset_unless_strict() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("store.json"), "garbage").unwrap();
        let store = crate::kv::FileStore::open(dir.path());

        let lenient = Preferences::new(store.clone());
        assert!(!lenient.show_sidebar().unwrap());
        assert_eq!(lenient.active_board().unwrap(), None);
        assert_eq!(lenient.theme().unwrap(), Theme::Dark);

        let strict = Preferences::new(store.clone()).with_policy(CorruptStatePolicy::Surface);
        assert!(matches!(strict.active_board(), Err(Error::CorruptState(_))));
        assert!(matches!(strict.set_theme(Theme::Light), Err(Error::CorruptState(_))));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("store.json")).unwrap(),
            "garbage"
        );

        lenient.set_active_board("Home").unwrap();
        assert_eq!(strict.active_board().unwrap().as_deref(), Some("Home"));
    }

    #[test]
    fn theme_parses_from_cli_words() {
        assert_eq!("Light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
