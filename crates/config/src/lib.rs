#![forbid(unsafe_code)]

mod artifacts;
mod error;
mod history;
mod model;
mod session;

pub use artifacts::Artifacts;
pub use error::Error;
pub use history::History;
pub use model::Model;
pub use session::{Session, Theme, View};

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub model: Model,
    pub history: History,
    pub artifacts: Artifacts,
    pub session: Session,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields are filled with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = toml_edit::de::from_str(&text)?;
        config.apply_defaults();
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let toml = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from multiple TOML files. Later files override earlier ones.
    /// Paths that do not exist are skipped.
    pub fn load_multiple<T, U>(paths: U) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        U: IntoIterator<Item = T>,
    {
        let mut merged = toml_edit::DocumentMut::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let doc: toml_edit::DocumentMut = text.parse()?;
            merge_document(&mut merged, doc);
        }
        let mut config: Config = toml_edit::de::from_str(&merged.to_string())?;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        // A zero cap would make every append a no-op.
        if self.history.max_records == 0 {
            self.history.max_records = History::default().max_records;
        }
        if self.history.display_limit == 0 {
            self.history.display_limit = self.history.max_records;
        }
    }
}

fn merge_document(target: &mut toml_edit::DocumentMut, source: toml_edit::DocumentMut) {
    for (key, item) in source.iter() {
        merge_item(
            target.entry(key).or_insert(toml_edit::Item::None),
            item.clone(),
        );
    }
}

fn merge_item(target: &mut toml_edit::Item, source: toml_edit::Item) {
    use toml_edit::Item;
    match (target, source) {
        (Item::Table(target_table), Item::Table(source_table)) => {
            for (key, item) in source_table.iter() {
                merge_item(target_table.entry(key).or_insert(Item::None), item.clone());
            }
        }
        (Item::ArrayOfTables(target_array), Item::ArrayOfTables(source_array)) => {
            for table in source_array.iter() {
                target_array.push(table.clone());
            }
        }
        (target_item, source_item) => {
            *target_item = source_item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.apply_defaults();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn load_multiple_merges() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("a.toml");
        let path2 = dir.path().join("b.toml");

        std::fs::write(
            &path1,
            "[model]\npath = \"m.json\"\n[history]\nmax_records = 10\n",
        )
        .unwrap();
        std::fs::write(&path2, "[history]\ndisplay_limit = 3\n[session]\ntheme = \"dark\"\n")
            .unwrap();

        let cfg = Config::load_multiple([path1, path2]).unwrap();
        assert_eq!(cfg.model.path, PathBuf::from("m.json"));
        assert_eq!(cfg.model.num_classes, 7);
        assert_eq!(cfg.history.max_records, 10);
        assert_eq!(cfg.history.display_limit, 3);
        assert_eq!(cfg.session.theme, Theme::Dark);
        assert_eq!(cfg.session.view, View::Single);
    }

    #[test]
    fn load_multiple_skips_missing_files() {
        let dir = tempdir().unwrap();
        let cfg = Config::load_multiple([dir.path().join("nope.toml")]).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn zero_cap_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history]\nmax_records = 0\ndisplay_limit = 0\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.history.max_records, 5000);
        assert_eq!(cfg.history.display_limit, 5000);
    }
}
