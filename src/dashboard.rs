use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::export;
use crate::pager::{Direction, DEFAULT_PAGE_SIZE};
use crate::session::SessionState;
use crate::store::{RecordStore, StoreError};

pub const LOAD_FAILED: &str = "Error loading user data. Please try again.";
pub const DELETED: &str = "User submission deleted successfully!";
pub const DELETE_FAILED: &str = "Error deleting user submission.";
pub const CLEARED: &str = "All user submissions cleared successfully!";
pub const CLEAR_FAILED: &str = "Error clearing user submissions.";
pub const EXPORTED: &str = "Data exported successfully!";
pub const NOTHING_TO_EXPORT: &str = "No data to export.";

pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this user submission?";
pub const CONFIRM_CLEAR: &str =
    "Are you sure you want to delete ALL user submissions? This action cannot be undone.";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no data to export")]
    EmptyExport,

    #[error("failed to write export file: {path}: {source}")]
    ExportWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message produced by one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Load,
    Search(String),
    Step(Direction),
    GoTo(usize),
    Delete(String),
    Clear,
    /// Destination directory or file; `None` uses the configured export dir.
    Export(Option<PathBuf>),
}

#[derive(Clone, Debug)]
pub struct DashboardOptions {
    pub page_size: usize,
    pub export_dir: Option<PathBuf>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            export_dir: None,
        }
    }
}

/// Runs actions against a store, one at a time.
///
/// Every failure is caught here: `apply` always hands back a usable state,
/// the previous one when the action failed.
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn RecordStore>,
    options: DashboardOptions,
}

pub struct Outcome {
    pub state: SessionState,
    pub notice: Option<Notice>,
}

impl Dashboard {
    pub fn new(store: Arc<dyn RecordStore>, options: DashboardOptions) -> Self {
        Self { store, options }
    }

    pub fn initial_state(&self) -> SessionState {
        SessionState::new(self.options.page_size)
    }

    pub async fn apply(&self, state: &SessionState, action: Action) -> Outcome {
        match action {
            Action::Load => match self.load(state).await {
                Ok(next) => Outcome {
                    state: next,
                    notice: None,
                },
                Err(e) => {
                    tracing::error!(error = %e, "error loading submissions");
                    failed(state, LOAD_FAILED.to_string())
                }
            },
            Action::Search(raw) => {
                let next = state.searched(&raw);
                let notice = crate::view::search_summary(&next).map(Notice::success);
                Outcome {
                    state: next,
                    notice,
                }
            }
            Action::Step(direction) => Outcome {
                state: state.stepped(direction),
                notice: None,
            },
            Action::GoTo(page) => Outcome {
                state: state.at_page(page),
                notice: None,
            },
            Action::Delete(id) => match self.store.delete_one(&id).await {
                Ok(()) => self.reload_after(state, DELETED).await,
                Err(e) => {
                    tracing::error!(error = %e, id = %id, "error deleting submission");
                    failed(state, format!("{DELETE_FAILED} ({e})"))
                }
            },
            Action::Clear => match self.store.delete_all().await {
                Ok(()) => self.reload_after(state, CLEARED).await,
                Err(e) => {
                    tracing::error!(error = %e, "error clearing submissions");
                    failed(state, CLEAR_FAILED.to_string())
                }
            },
            Action::Export(dest) => match self.export(state, dest.as_deref()).await {
                Ok(path) => Outcome {
                    state: state.clone(),
                    notice: Some(Notice::success(format!("{EXPORTED} ({})", path.display()))),
                },
                Err(DashboardError::EmptyExport) => {
                    tracing::warn!("export requested with no visible submissions");
                    failed(state, NOTHING_TO_EXPORT.to_string())
                }
                Err(e) => {
                    tracing::error!(error = %e, "error exporting submissions");
                    failed(state, e.to_string())
                }
            },
        }
    }

    async fn load(&self, state: &SessionState) -> Result<SessionState, DashboardError> {
        let records = self.store.fetch_all().await?;
        Ok(state.loaded(records))
    }

    async fn reload_after(&self, state: &SessionState, success: &str) -> Outcome {
        match self.load(state).await {
            Ok(next) => Outcome {
                state: next,
                notice: Some(Notice::success(success)),
            },
            Err(e) => {
                tracing::error!(error = %e, "error reloading submissions");
                failed(state, LOAD_FAILED.to_string())
            }
        }
    }

    /// Writes the filtered view as CSV and returns the file written.
    pub async fn export(
        &self,
        state: &SessionState,
        dest: Option<&Path>,
    ) -> Result<PathBuf, DashboardError> {
        if state.filtered().is_empty() {
            return Err(DashboardError::EmptyExport);
        }
        let dest = dest.or(self.options.export_dir.as_deref());
        let path = export::resolve_export_path(dest, chrono::Utc::now().date_naive());
        let csv = export::encode_csv(state.filtered());
        tokio::fs::write(&path, csv.as_bytes())
            .await
            .map_err(|e| DashboardError::ExportWrite {
                path: path.display().to_string(),
                source: e,
            })?;
        tracing::info!(rows = state.filtered().len(), path = %path.display(), "exported submissions");
        Ok(path)
    }
}

fn failed(state: &SessionState, text: String) -> Outcome {
    Outcome {
        state: state.clone(),
        notice: Some(Notice::error(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SubmissionRecord;
    use crate::store::MemoryStore;

    fn dashboard(n: usize) -> (Dashboard, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_records((1..=n).map(|i| {
            SubmissionRecord::new(
                format!("id{i:02}"),
                format!("98{i:08}"),
                "100",
                "SBI",
                "1234",
                format!("2024-01-01T00:{i:02}:00Z"),
            )
        })));
        (
            Dashboard::new(store.clone(), DashboardOptions::default()),
            store,
        )
    }

    #[tokio::test]
    async fn load_orders_newest_first() {
        let (dash, _) = dashboard(3);
        let out = dash.apply(&dash.initial_state(), Action::Load).await;
        assert!(out.notice.is_none());
        let ids: Vec<_> = out.state.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id03", "id02", "id01"]);
    }

    #[tokio::test]
    async fn delete_unknown_keeps_state_and_reports() {
        let (dash, store) = dashboard(2);
        let loaded = dash.apply(&dash.initial_state(), Action::Load).await.state;
        let out = dash.apply(&loaded, Action::Delete("ghost".into())).await;
        assert_eq!(out.state, loaded);
        let notice = out.notice.unwrap();
        assert!(notice.is_error());
        assert!(notice.text.starts_with(DELETE_FAILED));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn export_of_empty_view_is_refused() {
        let (dash, _) = dashboard(0);
        let dir = tempfile::tempdir().unwrap();
        let out = dash
            .apply(
                &dash.initial_state(),
                Action::Export(Some(dir.path().to_path_buf())),
            )
            .await;
        assert_eq!(out.notice, Some(Notice::error(NOTHING_TO_EXPORT)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
