//! Rubro Storage Layer
//!
//! Implements the ResultStore trait with one JSON file per entity and stage.
//!
//! # Layout
//!
//! - `<completion_dir>/salida_rubro_<RUT>.json`: completion record
//! - `<classification_dir>/clasificacion_<RUT>.json`: classification result
//!
//! Every file carries `schema_version`, the writing `run_id` and a
//! `written_at` timestamp next to the record fields. Saving replaces the
//! whole file (written to a temporary sibling, then renamed).
//!
//! # Examples
//!
//! ```no_run
//! use rubro_domain::RunId;
//! use rubro_store::JsonFileStore;
//!
//! let store = JsonFileStore::open("results", "results_clas", RunId::new()).unwrap();
//! ```

#![warn(missing_docs)]

mod schema;

use rubro_domain::traits::ResultStore;
use rubro_domain::{ClassificationResult, CompletionRecord, RunId, Rut};
use schema::{ClassificationFile, CompletionFile, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of completion record files
pub const COMPLETION_PREFIX: &str = "salida_rubro_";

/// Prefix of classification result files
pub const CLASSIFICATION_PREFIX: &str = "clasificacion_";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File was written by an incompatible schema
    #[error("Unsupported schema version {found} in {path} (expected {SCHEMA_VERSION})")]
    UnsupportedSchema {
        /// File involved
        path: PathBuf,
        /// Version found in the file
        found: u32,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// JSON file implementation of ResultStore
///
/// The store holds no lock: within a run every key is written by at most one
/// entity, so concurrent writers never target the same file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    completion_dir: PathBuf,
    classification_dir: PathBuf,
    run_id: RunId,
}

impl JsonFileStore {
    /// Open a store, creating both directories if absent
    pub fn open(
        completion_dir: impl Into<PathBuf>,
        classification_dir: impl Into<PathBuf>,
        run_id: RunId,
    ) -> Result<Self, StoreError> {
        let store = Self {
            completion_dir: completion_dir.into(),
            classification_dir: classification_dir.into(),
            run_id,
        };
        for dir in [&store.completion_dir, &store.classification_dir] {
            fs::create_dir_all(dir).map_err(io_error(dir))?;
        }
        Ok(store)
    }

    /// Run stamped into every written file
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Path of the completion record of `rut`
    pub fn completion_path(&self, rut: &Rut) -> PathBuf {
        self.completion_dir
            .join(format!("{}{}.json", COMPLETION_PREFIX, rut.file_stem()))
    }

    /// Path of the classification result of `rut`
    pub fn classification_path(&self, rut: &Rut) -> PathBuf {
        self.classification_dir
            .join(format!("{}{}.json", CLASSIFICATION_PREFIX, rut.file_stem()))
    }

    /// RUTs that have a stored completion record, sorted
    ///
    /// The identifier is read from each file, since file names only carry a
    /// sanitized stem. Files that do not parse as completion records are
    /// skipped.
    pub fn stored_completions(&self) -> Result<Vec<Rut>, StoreError> {
        let entries = fs::read_dir(&self.completion_dir).map_err(io_error(&self.completion_dir))?;
        let mut ruts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error(&self.completion_dir))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let is_record = name
                .strip_prefix(COMPLETION_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"))
                .is_some();
            if !is_record {
                continue;
            }
            let path = entry.path();
            let bytes = fs::read(&path).map_err(io_error(&path))?;
            match serde_json::from_slice::<CompletionFile>(&bytes) {
                Ok(file) => ruts.push(Rut::new(file.rut)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable completion record");
                }
            }
        }
        ruts.sort();
        Ok(ruts)
    }

    fn write_json(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(io_error(&tmp))?;
        fs::rename(&tmp, path).map_err(io_error(path))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote record");
        Ok(())
    }

    fn read_json(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path)(e)),
        }
    }

    fn check_version(path: &Path, found: u32) -> Result<(), StoreError> {
        if found != SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                path: path.to_path_buf(),
                found,
            });
        }
        Ok(())
    }
}

impl ResultStore for JsonFileStore {
    type Error = StoreError;

    fn save_completion(&self, record: &CompletionRecord) -> Result<(), Self::Error> {
        let file = CompletionFile::from_record(record, self.run_id);
        let bytes = serde_json::to_vec_pretty(&file)?;
        self.write_json(&self.completion_path(&record.rut), &bytes)
    }

    fn save_classification(&self, result: &ClassificationResult) -> Result<(), Self::Error> {
        let file = ClassificationFile::from_result(result, self.run_id);
        let bytes = serde_json::to_vec_pretty(&file)?;
        self.write_json(&self.classification_path(result.rut()), &bytes)
    }

    fn load_completion(&self, rut: &Rut) -> Result<Option<CompletionRecord>, Self::Error> {
        let path = self.completion_path(rut);
        let Some(bytes) = Self::read_json(&path)? else {
            return Ok(None);
        };
        let file: CompletionFile = serde_json::from_slice(&bytes)?;
        Self::check_version(&path, file.schema_version)?;
        Ok(Some(file.into_record()))
    }

    fn load_classification(&self, rut: &Rut) -> Result<Option<ClassificationResult>, Self::Error> {
        let path = self.classification_path(rut);
        let Some(bytes) = Self::read_json(&path)? else {
            return Ok(None);
        };
        let file: ClassificationFile = serde_json::from_slice(&bytes)?;
        Self::check_version(&path, file.completion.schema_version)?;
        Ok(Some(file.into_result()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rubro_domain::Document;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::open(dir.path().join("results"), dir.path().join("results_clas"), RunId::new())
            .unwrap()
    }

    fn record(rut: &str) -> CompletionRecord {
        let mut record = CompletionRecord::new(
            Rut::new(rut),
            Some(vec!["CONSTRUCCIÓN".to_string()]),
            vec![Document::emisor("FchEmis:2023-01-02 RznSocEmisor:Ñandú Ltda")],
            vec![Document::receptor("FchEmis:2023-02-01")],
        );
        record.emisor_completions.push("vendedor: ferretería".to_string());
        record
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(dir.path().join("results").is_dir());
        assert!(dir.path().join("results_clas").is_dir());
        assert!(store.stored_completions().unwrap().is_empty());
    }

    #[test]
    fn test_completion_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rec = record("76543210-k");

        store.save_completion(&rec).unwrap();

        assert!(dir.path().join("results/salida_rubro_76543210-K.json").is_file());
        let loaded = store.load_completion(&rec.rut).unwrap().unwrap();
        assert_eq!(loaded, rec);
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.load_completion(&Rut::new("1-9")).unwrap().is_none());
        assert!(store.load_classification(&Rut::new("1-9")).unwrap().is_none());
    }

    #[test]
    fn test_classification_uses_original_field_names() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let result = ClassificationResult::failed(record("1-9"), "Error en llamada a la API");

        store.save_classification(&result).unwrap();

        let raw = fs::read_to_string(dir.path().join("results_clas/clasificacion_1-9.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["rut"], "1-9");
        assert_eq!(value["clasificacion_economica"], serde_json::json!(["API_ERROR"]));
        assert_eq!(value["justification"], "Error en llamada a la API");
        assert_eq!(value["completaciones_receptor_limpias"], serde_json::json!([]));
        assert_eq!(value["run_id"], store.run_id().to_string());
        // non-ASCII is written verbatim
        assert!(raw.contains("ferretería"));

        let loaded = store.load_classification(&Rut::new("1-9")).unwrap().unwrap();
        assert_eq!(loaded, result);
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut rec = record("1-9");
        store.save_completion(&rec).unwrap();

        rec.emisor_completions.clear();
        store.save_completion(&rec).unwrap();

        let loaded = store.load_completion(&rec.rut).unwrap().unwrap();
        assert!(loaded.emisor_completions.is_empty());
        assert!(!dir.path().join("results/salida_rubro_1-9.json.tmp").exists());
    }

    #[test]
    fn test_unsupported_schema_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rec = record("1-9");
        store.save_completion(&rec).unwrap();

        let path = store.completion_path(&rec.rut);
        let raw = fs::read_to_string(&path).unwrap();
        fs::write(&path, raw.replace("\"schema_version\": 1", "\"schema_version\": 99")).unwrap();

        let err = store.load_completion(&rec.rut).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedSchema { found: 99, .. }));
    }

    #[test]
    fn test_stored_completions_lists_ruts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save_completion(&record("2-7")).unwrap();
        store.save_completion(&record("1-9")).unwrap();
        fs::write(dir.path().join("results/notes.txt"), "x").unwrap();

        assert_eq!(store.stored_completions().unwrap(), vec![Rut::new("1-9"), Rut::new("2-7")]);
    }

    #[test]
    fn test_stored_completions_keep_unsanitized_ruts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rec = record("76 543/210-k");
        store.save_completion(&rec).unwrap();
        fs::write(dir.path().join("results/salida_rubro_broken.json"), "{").unwrap();

        let ruts = store.stored_completions().unwrap();
        assert_eq!(ruts, vec![Rut::new("76 543/210-K")]);
        assert_eq!(store.load_completion(&ruts[0]).unwrap(), Some(rec));
    }
}
