//! Presenter — consumer side of the snapshot stream.

use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::info;

use crate::review::models::{ProcessingStatus, ReviewRecord};

/// Receives every snapshot yielded by a streaming run, in order.
pub trait Presenter {
    fn on_snapshot(&mut self, record: &ReviewRecord);
}

/// Progress view of one snapshot, as sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent<'a> {
    pub status: ProcessingStatus,
    pub progress: u8,
    pub label: &'static str,
    pub record: &'a ReviewRecord,
}

impl<'a> From<&'a ReviewRecord> for ProgressEvent<'a> {
    fn from(record: &'a ReviewRecord) -> Self {
        Self {
            status: record.status,
            progress: record.status.progress_percent(),
            label: record.status.label(),
            record,
        }
    }
}

/// Drains a snapshot stream into a presenter and returns the last snapshot.
pub async fn present<S, P>(snapshots: S, presenter: &mut P) -> Option<ReviewRecord>
where
    S: Stream<Item = ReviewRecord>,
    P: Presenter + ?Sized,
{
    let mut snapshots = std::pin::pin!(snapshots);
    let mut last = None;
    while let Some(record) = snapshots.next().await {
        presenter.on_snapshot(&record);
        last = Some(record);
    }
    last
}

/// Logs one line per snapshot.
#[derive(Debug, Default)]
pub struct TracingPresenter {
    pub snapshots: usize,
}

impl Presenter for TracingPresenter {
    fn on_snapshot(&mut self, record: &ReviewRecord) {
        self.snapshots += 1;
        info!(
            seq = self.snapshots,
            status = ?record.status,
            progress = record.status.progress_percent(),
            errors = record.errors.len(),
            "{}",
            record.status.label()
        );
        if record.status.is_terminal() {
            info!(
                "Review finished as {:?} after {} snapshots",
                record.status, self.snapshots
            );
        }
    }
}

/// Keeps the status of every snapshot.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StatusLog {
    pub statuses: Vec<ProcessingStatus>,
}

#[cfg(test)]
impl Presenter for StatusLog {
    fn on_snapshot(&mut self, record: &ReviewRecord) {
        self.statuses.push(record.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_present_forwards_every_snapshot() {
        let first = ReviewRecord::new("cv.txt", "text");
        let mut second = first.clone();
        second.advance(ProcessingStatus::ProcessedFileComplete);

        let mut log = StatusLog::default();
        let last = present(futures::stream::iter(vec![first, second]), &mut log).await;

        assert_eq!(
            log.statuses,
            vec![
                ProcessingStatus::Started,
                ProcessingStatus::ProcessedFileComplete
            ]
        );
        assert_eq!(
            last.map(|r| r.status),
            Some(ProcessingStatus::ProcessedFileComplete)
        );
    }

    #[tokio::test]
    async fn test_tracing_presenter_counts_snapshots() {
        let first = ReviewRecord::new("cv.txt", "text");
        let mut last = first.clone();
        last.fail("Missing source text for extraction");

        let mut presenter = TracingPresenter::default();
        present(futures::stream::iter(vec![first, last]), &mut presenter).await;

        assert_eq!(presenter.snapshots, 2);
    }

    #[test]
    fn test_progress_event_serializes_status_and_record() {
        let record = ReviewRecord::new("cv.txt", "text");
        let json = serde_json::to_value(ProgressEvent::from(&record)).unwrap();
        assert_eq!(json["status"], "started");
        assert_eq!(json["progress"], 16);
        assert_eq!(json["label"], "Processing uploaded file");
        assert_eq!(json["record"]["source_name"], "cv.txt");
    }
}
