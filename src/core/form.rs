use crate::core::JsonPoster;
use crate::domain::model::{default_range, DateRange};
use crate::utils::error::Result;
use chrono::{DateTime, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

pub const DEFAULT_ENDPOINT: &str = "/valorant/matches-per-day.json";

/// What the view shows about the most recent submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    Idle,
    Pending {
        request_id: u64,
    },
    Succeeded {
        request_id: u64,
        response: serde_json::Value,
    },
    Failed {
        request_id: u64,
        message: String,
        retryable: bool,
    },
}

impl SubmitStatus {
    pub fn request_id(&self) -> Option<u64> {
        match self {
            SubmitStatus::Idle => None,
            SubmitStatus::Pending { request_id }
            | SubmitStatus::Succeeded { request_id, .. }
            | SubmitStatus::Failed { request_id, .. } => Some(*request_id),
        }
    }
}

/// View-model for the range picker and its submit button.
///
/// The picked range is a plain field, replaced whole by [`on_change`](Self::on_change).
/// Submit outcomes go to a watch channel, so a view can observe failures
/// instead of losing them.
pub struct DateRangeForm<P: JsonPoster> {
    poster: P,
    endpoint: String,
    range: DateRange,
    status: watch::Sender<SubmitStatus>,
    last_request: AtomicU64,
}

impl<P: JsonPoster> DateRangeForm<P> {
    pub fn new<Tz: TimeZone>(
        poster: P,
        endpoint: impl Into<String>,
        reference: &DateTime<Tz>,
    ) -> Self {
        Self::with_range(poster, endpoint, default_range(reference))
    }

    pub fn with_range(poster: P, endpoint: impl Into<String>, range: DateRange) -> Self {
        let (status, _) = watch::channel(SubmitStatus::Idle);
        Self {
            poster,
            endpoint: endpoint.into(),
            range,
            status,
            last_request: AtomicU64::new(0),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The picker changed.
    pub fn on_change(&mut self, range: DateRange) {
        tracing::debug!("Range changed to {}", range);
        self.range = range;
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmitStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SubmitStatus {
        self.status.borrow().clone()
    }

    /// The button was clicked: post the current range once.
    ///
    /// The caller always gets its own outcome back. The status channel only
    /// takes the outcome of the newest submit, so an older, slower response
    /// cannot overwrite it.
    pub async fn submit(&self) -> Result<serde_json::Value> {
        let range = self.range;

        if !range.is_ordered() {
            tracing::warn!("Submitting a range whose begin is after its end: {}", range);
        }

        // Id allocation and the Pending publish share the watch lock, so an
        // older Pending can never land after a newer outcome.
        let mut request_id = 0;
        self.status.send_modify(|current| {
            request_id = self.last_request.fetch_add(1, Ordering::SeqCst) + 1;
            *current = SubmitStatus::Pending { request_id };
        });
        tracing::info!("Submitting {} to {} (request #{})", range, self.endpoint, request_id);

        let outcome = match serde_json::to_value(range.payload()) {
            Ok(payload) => self.poster.post_json(&self.endpoint, &payload).await,
            Err(e) => Err(e.into()),
        };

        let next_status = match &outcome {
            Ok(response) => {
                tracing::info!("Request #{} succeeded", request_id);
                SubmitStatus::Succeeded {
                    request_id,
                    response: response.clone(),
                }
            }
            Err(e) => {
                tracing::error!(
                    "Request #{} failed: {} (Category: {:?})",
                    request_id,
                    e,
                    e.category()
                );
                SubmitStatus::Failed {
                    request_id,
                    message: e.user_friendly_message(),
                    retryable: e.is_retryable(),
                }
            }
        };

        let published = self.status.send_if_modified(|current| {
            if self.last_request.load(Ordering::SeqCst) != request_id {
                return false;
            }
            *current = next_status;
            true
        });
        if !published {
            tracing::debug!("Dropping stale outcome of request #{}", request_id);
        }

        outcome
    }
}
