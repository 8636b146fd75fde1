//! # Recording Persistence
//!
//! Captured data blocks are written as float64 `.npy` arrays whose file name
//! encodes who was recorded under which condition:
//!
//! | Protocol | Template | Fallback (subject or drug unset) |
//! |----------|----------|----------------------------------|
//! | drug exposure | `data_<sub><drug>.npy` | `data.npy` |
//! | resting state | `data_subject-<sub>_drug-<drug>_session-<n>_condition-<cond>.npy` | `data_session-<n>.npy` |
//!
//! Names are a pure function of their inputs; saving twice with the same
//! label overwrites the earlier file.

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::error::{ProtocolError, ProtocolResult};

/// Who/what a recording belongs to. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingLabel {
    pub subject: Option<String>,
    pub drug: Option<String>,
}

impl RecordingLabel {
    pub fn new(subject: Option<String>, drug: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            subject: non_empty(subject),
            drug: non_empty(drug),
        }
    }

    fn subject_and_drug(&self) -> Option<(&str, &str)> {
        Some((self.subject.as_deref()?, self.drug.as_deref()?))
    }

    /// File name of the single drug-exposure recording.
    ///
    /// ```
    /// use eeg_protocols::recording::RecordingLabel;
    ///
    /// let label = RecordingLabel::new(Some("s01".into()), Some("sober".into()));
    /// assert_eq!(label.single_run_file_name(), "data_s01sober.npy");
    /// assert_eq!(RecordingLabel::default().single_run_file_name(), "data.npy");
    /// ```
    #[must_use]
    pub fn single_run_file_name(&self) -> String {
        match self.subject_and_drug() {
            Some((subject, drug)) => format!("data_{subject}{drug}.npy"),
            None => "data.npy".to_string(),
        }
    }

    /// File name of resting-state session `session`.
    #[must_use]
    pub fn session_file_name(&self, session: u32, condition: &str) -> String {
        match self.subject_and_drug() {
            Some((subject, drug)) => format!(
                "data_subject-{subject}_drug-{drug}_session-{session}_condition-{condition}.npy"
            ),
            None => format!("data_session-{session}.npy"),
        }
    }
}

/// Writes data blocks into one output directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    output_dir: PathBuf,
}

impl DataStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Write `data` as `<output_dir>/<file_name>`, creating the directory.
    ///
    /// # Errors
    /// [`ProtocolError::PersistenceFailed`] naming the target path.
    pub fn save(&self, file_name: &str, data: &Array2<f64>) -> ProtocolResult<PathBuf> {
        let path = self.path_for(file_name);
        let failed = |reason: String| ProtocolError::PersistenceFailed {
            path: path.clone(),
            reason,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|e| failed(e.to_string()))?;
        if path.exists() {
            tracing::warn!(path = %path.display(), "Overwriting existing recording");
        }
        ndarray_npy::write_npy(&path, data).map_err(|e| failed(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            rows = data.nrows(),
            samples = data.ncols(),
            "Recording saved"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(label: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "eeg-protocols-recording-tests-{}-{}-{}",
            label,
            std::process::id(),
            now
        ))
    }

    fn label(subject: &str, drug: &str) -> RecordingLabel {
        RecordingLabel::new(Some(subject.into()), Some(drug.into()))
    }

    #[test]
    fn test_single_run_file_name() {
        assert_eq!(label("unknown", "sober").single_run_file_name(), "data_unknownsober.npy");
        assert_eq!(
            RecordingLabel::new(Some("s01".into()), None).single_run_file_name(),
            "data.npy"
        );
        assert_eq!(
            RecordingLabel::new(Some(String::new()), Some("thc".into())).single_run_file_name(),
            "data.npy"
        );
    }

    #[test]
    fn test_session_file_name() {
        assert_eq!(
            label("s01", "dmt").session_file_name(3, "c"),
            "data_subject-s01_drug-dmt_session-3_condition-c.npy"
        );
        assert_eq!(
            RecordingLabel::default().session_file_name(3, "c"),
            "data_session-3.npy"
        );
    }

    #[test]
    fn test_file_names_are_idempotent() {
        let l = label("s01", "dmt");
        assert_eq!(l.session_file_name(1, "o"), l.session_file_name(1, "o"));
        assert_eq!(l.single_run_file_name(), l.clone().single_run_file_name());
    }

    #[test]
    fn test_blank_fields_are_unset() {
        let l = RecordingLabel::new(Some("  ".into()), Some("sober".into()));
        assert_eq!(l.subject, None);
        assert_eq!(l.drug.as_deref(), Some("sober"));
    }

    #[test]
    fn test_save_creates_dir_and_round_trips() {
        let dir = unique_temp_dir("save").join("nested");
        let store = DataStore::new(&dir);
        let data = Array2::from_shape_fn((24, 5), |(r, c)| (r * 10 + c) as f64);

        let path = store.save("data.npy", &data).unwrap();
        assert_eq!(path, dir.join("data.npy"));

        let read: Array2<f64> = ndarray_npy::read_npy(&path).unwrap();
        assert_eq!(read, data);

        // Same name again overwrites.
        let zeros = Array2::<f64>::zeros((24, 2));
        store.save("data.npy", &zeros).unwrap();
        let read: Array2<f64> = ndarray_npy::read_npy(&path).unwrap();
        assert_eq!(read.ncols(), 2);

        std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_save_reports_target_path_on_failure() {
        let dir = unique_temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where the output directory should be.
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let store = DataStore::new(&blocker);
        let err = store
            .save("data.npy", &Array2::<f64>::zeros((1, 1)))
            .unwrap_err();
        match err {
            ProtocolError::PersistenceFailed { path, .. } => {
                assert_eq!(path, blocker.join("data.npy"));
            }
            other => panic!("unexpected error: {other}"),
        }

        std::fs::remove_dir_all(dir).unwrap();
    }
}
