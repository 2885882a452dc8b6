use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::dashboard::{
    Action, Dashboard, DashboardOptions, Notice, CLEARED, DELETED, LOAD_FAILED, NOTHING_TO_EXPORT,
};
use crate::pager::Direction;
use crate::record::SubmissionRecord;
use crate::store::{MemoryStore, RecordStore, StoreError};

fn submissions(n: usize) -> Vec<SubmissionRecord> {
    (1..=n)
        .map(|i| {
            let bank = match i % 3 {
                0 => "HDFC Bank",
                1 => "State Bank of India",
                _ => "Axis",
            };
            SubmissionRecord::new(
                format!("-N{i:03}"),
                format!("98765{i:05}"),
                format!("{}", i * 100),
                bank,
                format!("{:04}", 1000 + i),
                format!("2024-05-01T{:02}:{:02}:00Z", i / 60, i % 60),
            )
        })
        .collect()
}

fn dashboard_over(store: Arc<dyn RecordStore>) -> Dashboard {
    Dashboard::new(store, DashboardOptions::default())
}

#[tokio::test]
async fn twenty_five_submissions_paginate_into_three_pages() {
    let dash = dashboard_over(Arc::new(MemoryStore::with_records(submissions(25))));
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;

    let first = crate::view::project(&state);
    assert_eq!(first.page_label, "Page 1 of 3");
    assert!(!first.prev_enabled);
    assert!(first.next_enabled);
    assert_eq!(first.rows[0].id, "-N025");

    let mut state = state;
    for _ in 0..5 {
        state = dash
            .apply(&state, Action::Step(Direction::Next))
            .await
            .state;
    }
    let last = crate::view::project(&state);
    assert_eq!(last.page, 3);
    assert_eq!(last.rows.len(), 5);
    assert!(!last.next_enabled);
    let ids: Vec<_> = last.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["-N005", "-N004", "-N003", "-N002", "-N001"]);
}

#[tokio::test]
async fn search_reports_count_and_resets_page() {
    let dash = dashboard_over(Arc::new(MemoryStore::with_records(submissions(25))));
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let state = dash.apply(&state, Action::GoTo(3)).await.state;

    let out = dash.apply(&state, Action::Search(" HDFC ".into())).await;
    assert_eq!(out.state.page(), 1);
    assert_eq!(out.state.filtered().len(), 8);
    assert_eq!(
        out.notice,
        Some(Notice::success("Found 8 results for \"hdfc\""))
    );

    let reset = dash.apply(&out.state, Action::Search(String::new())).await;
    assert!(reset.notice.is_none());
    assert_eq!(reset.state.filtered().len(), 25);
}

#[tokio::test]
async fn delete_removes_exactly_one_and_reloads() {
    let store = Arc::new(MemoryStore::with_records(submissions(12)));
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;

    let out = dash.apply(&state, Action::Delete("-N007".into())).await;
    assert_eq!(out.notice, Some(Notice::success(DELETED)));
    assert_eq!(store.len(), 11);
    assert_eq!(out.state.all().len(), 11);
    assert!(out.state.all().iter().all(|r| r.id != "-N007"));
}

#[tokio::test]
async fn delete_keeps_active_search_after_reload() {
    let store = Arc::new(MemoryStore::with_records(submissions(9)));
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let state = dash.apply(&state, Action::Search("axis".into())).await.state;
    assert_eq!(state.filtered().len(), 3);

    let out = dash.apply(&state, Action::Delete("-N002".into())).await;
    assert_eq!(out.state.term(), "axis");
    assert_eq!(out.state.filtered().len(), 2);
}

#[tokio::test]
async fn clear_empties_the_store_and_shows_empty_state() {
    let store = Arc::new(MemoryStore::with_records(submissions(30)));
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let state = dash.apply(&state, Action::GoTo(3)).await.state;

    let out = dash.apply(&state, Action::Clear).await;
    assert_eq!(out.notice, Some(Notice::success(CLEARED)));
    assert!(store.is_empty());
    let model = crate::view::project(&out.state);
    assert!(model.empty);
    assert_eq!(model.total_submissions, 0);
    assert_eq!(model.page_label, "Page 1 of 1");
}

#[tokio::test]
async fn export_writes_header_and_one_row_per_filtered_record() {
    let dash = dashboard_over(Arc::new(MemoryStore::with_records(submissions(25))));
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let state = dash.apply(&state, Action::Search("axis".into())).await.state;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("axis.csv");

    let out = dash
        .apply(&state, Action::Export(Some(target.clone())))
        .await;
    assert!(!out.notice.unwrap().is_error());

    let csv = std::fs::read_to_string(&target).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Mobile Number,Amount,Bank,UPI Pin");
    assert_eq!(lines.len(), 1 + state.filtered().len());
    assert!(lines[1..].iter().all(|l| l.contains("\"Axis\"")));
}

#[tokio::test]
async fn export_into_directory_uses_dated_name() {
    let dir = tempfile::tempdir().unwrap();
    let dash = Dashboard::new(
        Arc::new(MemoryStore::with_records(submissions(2))),
        DashboardOptions {
            export_dir: Some(dir.path().to_path_buf()),
            ..DashboardOptions::default()
        },
    );
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let path = dash.export(&state, None).await.unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("user-submissions-"));
    assert!(name.ends_with(".csv"));
    assert_eq!(path.parent().unwrap(), dir.path());
}

#[tokio::test]
async fn export_with_no_matches_writes_nothing() {
    let dash = dashboard_over(Arc::new(MemoryStore::with_records(submissions(5))));
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;
    let state = dash.apply(&state, Action::Search("no-such-bank".into())).await.state;
    let dir = tempfile::tempdir().unwrap();

    let out = dash
        .apply(&state, Action::Export(Some(dir.path().to_path_buf())))
        .await;
    assert_eq!(out.notice, Some(Notice::error(NOTHING_TO_EXPORT)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Store whose reads can be switched off, for exercising failure paths.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    reads_down: AtomicBool,
    writes_down: AtomicBool,
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            });
        }
        self.inner.fetch_all().await
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            });
        }
        self.inner.delete_one(id).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            });
        }
        self.inner.delete_all().await
    }
}

fn flaky(n: usize) -> Arc<FlakyStore> {
    Arc::new(FlakyStore {
        inner: MemoryStore::with_records(submissions(n)),
        ..FlakyStore::default()
    })
}

#[tokio::test]
async fn failed_load_keeps_previous_state() {
    let store = flaky(4);
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;

    store.reads_down.store(true, Ordering::SeqCst);
    let out = dash.apply(&state, Action::Load).await;
    assert_eq!(out.notice, Some(Notice::error(LOAD_FAILED)));
    assert_eq!(out.state, state);
}

#[tokio::test]
async fn failed_clear_changes_nothing() {
    let store = flaky(4);
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;

    store.writes_down.store(true, Ordering::SeqCst);
    let out = dash.apply(&state, Action::Clear).await;
    assert!(out.notice.unwrap().is_error());
    assert_eq!(out.state.all().len(), 4);
    assert_eq!(store.inner.len(), 4);
}

#[tokio::test]
async fn reload_failure_after_delete_reports_load_error() {
    let store = flaky(4);
    let dash = dashboard_over(store.clone());
    let state = dash.apply(&dash.initial_state(), Action::Load).await.state;

    store.reads_down.store(true, Ordering::SeqCst);
    let out = dash.apply(&state, Action::Delete("-N001".into())).await;
    assert_eq!(out.notice, Some(Notice::error(LOAD_FAILED)));
    assert_eq!(store.inner.len(), 3);
    assert_eq!(out.state.all().len(), 4);
}
