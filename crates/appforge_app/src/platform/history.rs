use std::fs;
use std::path::Path;

use appforge_engine::{ensure_output_dir, AtomicFileWriter};
use engine_logging::{engine_error, engine_warn};
use serde::{Deserialize, Serialize};

const HISTORY_FILENAME: &str = ".appforge_history.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub succeeded: bool,
    /// Message on success, error text on failure.
    pub text: String,
    pub installer_path: Option<String>,
    pub finished_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedHistory {
    entries: Vec<HistoryEntry>,
}

pub(crate) fn load_history(output_dir: &Path) -> Vec<HistoryEntry> {
    let path = output_dir.join(HISTORY_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            engine_warn!("Failed to read history from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    match ron::from_str::<PersistedHistory>(&content) {
        Ok(history) => history.entries,
        Err(err) => {
            engine_warn!("Failed to parse history from {:?}: {}", path, err);
            Vec::new()
        }
    }
}

pub(crate) fn append_history(output_dir: &Path, entry: HistoryEntry) {
    if let Err(err) = ensure_output_dir(output_dir) {
        engine_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let mut history = PersistedHistory {
        entries: load_history(output_dir),
    };
    history.entries.push(entry);

    let content = match ron::ser::to_string_pretty(&history, ron::ser::PrettyConfig::new()) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize history: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    if let Err(err) = writer.write(HISTORY_FILENAME, &content) {
        engine_error!("Failed to write history to {:?}: {}", output_dir, err);
    }
}

pub(crate) fn format_entry(entry: &HistoryEntry) -> String {
    let status = if entry.succeeded { "OK " } else { "ERR" };
    format!("{} {} {} | {}", entry.finished_utc, status, entry.url, entry.text)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn entry(url: &str, succeeded: bool) -> HistoryEntry {
        HistoryEntry {
            url: url.to_string(),
            succeeded,
            text: if succeeded { "done" } else { "boom" }.to_string(),
            installer_path: succeeded.then(|| "x.msi".to_string()),
            finished_utc: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn history_round_trips_in_order() {
        let temp = TempDir::new().unwrap();
        append_history(temp.path(), entry("https://a.example", true));
        append_history(temp.path(), entry("https://b.example", false));

        let loaded = load_history(temp.path());
        assert_eq!(
            loaded,
            vec![entry("https://a.example", true), entry("https://b.example", false)]
        );
    }

    #[test]
    fn corrupt_history_is_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(HISTORY_FILENAME), "not ron at all (").unwrap();
        assert!(load_history(temp.path()).is_empty());

        append_history(temp.path(), entry("https://c.example", true));
        assert_eq!(load_history(temp.path()).len(), 1);
    }

    #[test]
    fn entries_format_on_one_line() {
        assert_eq!(
            format_entry(&entry("https://a.example", false)),
            "2026-01-01T00:00:00+00:00 ERR https://a.example | boom"
        );
    }
}
