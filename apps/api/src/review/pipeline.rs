//! Review pipeline — drives a record through Extract → Analyze → Feedback → Recommend.
//!
//! Yield points of a streaming run, in order:
//!
//! | # | After                | Status                    |
//! |---|----------------------|---------------------------|
//! | 1 | record construction  | `started`                 |
//! | 2 | file-to-text         | `processed_file_complete` |
//! | 3 | Extract              | `extraction_complete`     |
//! | 4 | Analyze              | `analysis_complete`       |
//! | 5 | Feedback             | `feedback_complete`       |
//! | 6 | Recommend + finalize | `completed`               |
//!
//! A stage whose inputs are missing halts the run: the snapshot after it is
//! `failed` and the stream ends. Generation failures only degrade the stage
//! output and never stop the run.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{error, info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::llm_client::GenerationClient;
use crate::review::ingest::{Document, TextExtractionAdapter};
use crate::review::models::{ProcessingStatus, ReviewRecord};
use crate::review::stage::{Stage, StageOutcome};

/// Runs reviews against one shared generation client.
///
/// Cheap to clone; each run owns its own record, so concurrent runs share
/// nothing but the client.
#[derive(Clone)]
pub struct Pipeline {
    client: Arc<dyn GenerationClient>,
}

impl Pipeline {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Runs every stage and returns the final record.
    pub async fn run(
        &self,
        source_name: impl Into<String>,
        source_text: impl Into<String>,
    ) -> ReviewRecord {
        let source_name = source_name.into();
        let fallback_name = source_name.clone();
        let snapshots = self.run_streaming(source_name, source_text);
        let mut snapshots = std::pin::pin!(snapshots);

        let mut last = None;
        while let Some(record) = snapshots.next().await {
            last = Some(record);
        }
        // The stream always yields its initial snapshot.
        last.unwrap_or_else(|| ReviewRecord::new(fallback_name, String::new()))
    }

    /// Lazily runs the review, yielding a snapshot at every yield point.
    ///
    /// Nothing happens until the stream is polled. Dropping the stream stops
    /// the run after the stage currently in flight.
    pub fn run_streaming(
        &self,
        source_name: impl Into<String>,
        source_text: impl Into<String>,
    ) -> impl Stream<Item = ReviewRecord> + Send + 'static {
        let client = Arc::clone(&self.client);
        let mut record = ReviewRecord::new(source_name, source_text);

        stream! {
            let span = review_span(&record);
            yield record.clone();

            record.advance(ProcessingStatus::ProcessedFileComplete);
            yield record.clone();

            for await snapshot in drive_stages(client, record, span) {
                yield snapshot;
            }
        }
    }

    /// Like `run_streaming`, but reads the text out of `document` first.
    ///
    /// Adapter failures pin the record at `failed` with the adapter's message
    /// and end the stream after that snapshot.
    pub fn run_document_streaming(
        &self,
        adapter: Arc<dyn TextExtractionAdapter>,
        document: Document,
    ) -> impl Stream<Item = ReviewRecord> + Send + 'static {
        let client = Arc::clone(&self.client);

        stream! {
            let mut record = ReviewRecord {
                source_name: Some(document.file_name.clone()),
                ..ReviewRecord::default()
            };
            record.advance(ProcessingStatus::Started);
            let span = review_span(&record);
            yield record.clone();

            match adapter.process(&document) {
                Ok((name, text)) => {
                    span.in_scope(|| info!(chars = text.len(), "Document converted to text"));
                    record.source_name = Some(name);
                    record.source_text = Some(text);
                    record.advance(ProcessingStatus::ProcessedFileComplete);
                    yield record.clone();
                }
                Err(err) => {
                    span.in_scope(|| error!("Document rejected: {err}"));
                    record.fail(err.to_string());
                    yield record;
                    return;
                }
            }

            for await snapshot in drive_stages(client, record, span) {
                yield snapshot;
            }
        }
    }
}

fn review_span(record: &ReviewRecord) -> Span {
    info_span!(
        "review",
        run_id = %Uuid::new_v4(),
        source = record.source_name.as_deref().unwrap_or_default()
    )
}

/// Runs the four stages in order, yielding after each one.
fn drive_stages(
    client: Arc<dyn GenerationClient>,
    mut record: ReviewRecord,
    span: Span,
) -> impl Stream<Item = ReviewRecord> + Send + 'static {
    stream! {
        for stage in Stage::ALL {
            let outcome = stage
                .run(client.as_ref(), &mut record)
                .instrument(span.clone())
                .await;

            if outcome == StageOutcome::Halted {
                record.advance(ProcessingStatus::Failed);
                span.in_scope(|| error!(%stage, "Review halted: required input missing"));
                yield record;
                return;
            }

            if stage == Stage::Recommend {
                record.advance(ProcessingStatus::Completed);
                span.in_scope(|| {
                    info!(
                        errors = record.errors.len(),
                        "Review completed"
                    )
                });
            }
            yield record.clone();
        }
    }
}
