use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use student_intake::workflows::registration::{
    sort_newest_first, ColumnSet, ExportFormat, NewSubmission, RepositoryError, Submission,
    SubmissionId, SubmissionRepository,
};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreState {
    next_id: u64,
    records: BTreeMap<SubmissionId, Submission>,
}

/// Mutex-guarded record store, optionally mirrored to a JSON snapshot file after every write.
/// A write whose snapshot cannot be saved is rolled back before the error is returned.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    state: Arc<Mutex<StoreState>>,
    snapshot: Option<PathBuf>,
}

impl InMemorySubmissionRepository {
    /// Open a store backed by `path`, loading existing records when the file is present.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records: Vec<Submission> = if path.exists() {
            let raw = fs::read(&path).map_err(|err| unavailable(&path, err))?;
            serde_json::from_slice(&raw).map_err(|err| unavailable(&path, err))?
        } else {
            Vec::new()
        };

        let next_id = records.iter().map(|record| record.id.0).max().unwrap_or(0);
        let records = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect::<BTreeMap<_, _>>();
        info!(path = %path.display(), records = records.len(), "submission store loaded");

        Ok(Self {
            state: Arc::new(Mutex::new(StoreState { next_id, records })),
            snapshot: Some(path),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("submission store lock poisoned".to_string()))
    }

    fn persist(&self, state: &StoreState) -> Result<(), RepositoryError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let records: Vec<&Submission> = state.records.values().collect();
        let bytes = serde_json::to_vec_pretty(&records).map_err(|err| unavailable(path, err))?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| unavailable(path, err))?;
        }
        fs::write(path, bytes).map_err(|err| unavailable(path, err))?;
        debug!(path = %path.display(), records = records.len(), "submission store persisted");
        Ok(())
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, submission: NewSubmission) -> Result<Submission, RepositoryError> {
        let mut guard = self.lock()?;
        if guard
            .records
            .values()
            .any(|record| record.submission_code == submission.submission_code)
        {
            return Err(RepositoryError::Conflict(submission.submission_code.0));
        }

        let id = SubmissionId(guard.next_id + 1);
        let record = submission.into_submission(id, Utc::now());
        guard.records.insert(id, record.clone());
        if let Err(err) = self.persist(&guard) {
            guard.records.remove(&id);
            return Err(err);
        }
        guard.next_id = id.0;
        Ok(record)
    }

    fn update(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.lock()?;
        let slot = guard
            .records
            .get_mut(&submission.id)
            .ok_or(RepositoryError::NotFound)?;
        let previous = std::mem::replace(slot, submission.clone());
        if let Err(err) = self.persist(&guard) {
            guard.records.insert(previous.id, previous);
            return Err(err);
        }
        Ok(submission)
    }

    fn fetch(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(&id).cloned())
    }

    fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let removed = guard.records.remove(&id).ok_or(RepositoryError::NotFound)?;
        if let Err(err) = self.persist(&guard) {
            guard.records.insert(id, removed);
            return Err(err);
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<Submission> = guard.records.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn search(&self, query: &str) -> Result<Vec<Submission>, RepositoryError> {
        let mut records = self.all()?;
        records.retain(|record| record.matches(query));
        Ok(records)
    }

    fn codes(&self) -> Result<BTreeSet<String>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .values()
            .map(|record| record.submission_code.0.clone())
            .collect())
    }
}

pub(crate) fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_columns(raw: &str) -> Result<ColumnSet, String> {
    ColumnSet::parse(raw)
        .ok_or_else(|| format!("unknown column set '{raw}' (expected registration or full)"))
}
