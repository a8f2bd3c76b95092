// ReportScope - app/fetch.rs
//
// Log fetch coordination. Requests run on background threads against the
// current `LogSource`; results come back over an mpsc channel that the UI
// polls once per frame (same pattern as any long-running job here).
//
// Staleness: every request gets a `FetchTicket` (report id + generation).
// Only the result for the latest ticket is committed; anything older,
// whether for another report or for an older filter on the same report,
// is dropped on arrival. Fetches are never cancelled, just ignored.

use crate::app::source::LogSource;
use crate::core::model::{Log, LogRequest, RawLog};
use crate::core::severity::SeverityName;
use crate::core::tree::ReportKind;
use crate::util::error::FetchError;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Identity of one log request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub report_id: String,
    pub generation: u64,
}

/// What `refresh` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No severity selected: the log list is empty and no request was made.
    Cleared,
    Requested(FetchTicket),
}

/// A committed (non-stale) fetch result.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    Loaded {
        ticket: FetchTicket,
        logs: Vec<Log>,
    },
    Failed {
        ticket: FetchTicket,
        error: FetchError,
    },
}

struct FetchResult {
    ticket: FetchTicket,
    result: Result<Vec<RawLog>, FetchError>,
}

pub struct LogFetchCoordinator {
    source: Arc<dyn LogSource>,
    tx: mpsc::Sender<FetchResult>,
    rx: mpsc::Receiver<FetchResult>,
    current: Option<FetchTicket>,
    awaiting: bool,
    next_generation: u64,
    in_flight: usize,
}

impl LogFetchCoordinator {
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            current: None,
            awaiting: false,
            next_generation: 0,
            in_flight: 0,
        }
    }

    /// Swap the log source (e.g. a new report was loaded). Any in-flight
    /// result becomes stale.
    pub fn set_source(&mut self, source: Arc<dyn LogSource>) {
        self.source = source;
        self.invalidate();
    }

    /// Request the logs of `report_id` at `severities`.
    ///
    /// An empty severity set short-circuits to `Cleared` without touching
    /// the source. Otherwise the request runs on a worker thread and its
    /// result is delivered by [`poll`](Self::poll).
    pub fn refresh(
        &mut self,
        report_id: &str,
        kind: ReportKind,
        severities: &BTreeSet<SeverityName>,
        text_filter: Option<&str>,
    ) -> RefreshOutcome {
        if severities.is_empty() {
            self.invalidate();
            tracing::debug!(report = report_id, "No severity selected; logs cleared");
            return RefreshOutcome::Cleared;
        }

        let ticket = FetchTicket {
            report_id: report_id.to_string(),
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.current = Some(ticket.clone());
        self.awaiting = true;
        self.in_flight += 1;

        let request = LogRequest {
            report_id: report_id.to_string(),
            kind,
            severities: severities.clone(),
            text_filter: text_filter.filter(|t| !t.is_empty()).map(str::to_string),
        };
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let worker_ticket = ticket.clone();

        std::thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| source.fetch_logs(&request)))
                .unwrap_or_else(|_| {
                    Err(FetchError::WorkerLost {
                        report_id: request.report_id.clone(),
                    })
                });
            // Receiver dropped means the viewer is gone; nothing to do.
            let _ = tx.send(FetchResult {
                ticket: worker_ticket,
                result,
            });
        });

        tracing::debug!(
            report = report_id,
            kind = ?kind,
            generation = ticket.generation,
            severities = severities.len(),
            "Log fetch requested"
        );
        RefreshOutcome::Requested(ticket)
    }

    /// Drain finished fetches without blocking; stale results are dropped.
    pub fn poll(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            events.extend(self.commit(done.ticket, done.result));
        }
        events
    }

    /// Block until the current request resolves or `timeout` elapses.
    /// Returns every committed event seen meanwhile.
    pub fn wait(&mut self, timeout: Duration) -> Vec<FetchEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.awaiting {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(done) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    events.extend(self.commit(done.ticket, done.result));
                }
                Err(_) => break,
            }
        }
        events
    }

    /// Commit `result` if `ticket` is still the latest request.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawLog>, FetchError>,
    ) -> Option<FetchEvent> {
        if self.current.as_ref() != Some(&ticket) {
            tracing::debug!(
                report = %ticket.report_id,
                generation = ticket.generation,
                "Discarding stale log fetch result"
            );
            return None;
        }
        self.awaiting = false;
        Some(match result {
            Ok(raw) => {
                let logs: Vec<Log> = raw.into_iter().map(Log::from_raw).collect();
                tracing::debug!(report = %ticket.report_id, logs = logs.len(), "Logs loaded");
                FetchEvent::Loaded { ticket, logs }
            }
            Err(error) => {
                tracing::warn!(report = %ticket.report_id, error = %error, "Log fetch failed");
                FetchEvent::Failed { ticket, error }
            }
        })
    }

    /// Make every outstanding request stale.
    pub fn invalidate(&mut self) {
        self.current = None;
        self.awaiting = false;
    }

    /// True while the latest request has not resolved.
    pub fn is_loading(&self) -> bool {
        self.awaiting
    }

    /// Requests still running, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    /// Counts calls and answers with one log echoing the report id.
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl LogSource for CountingSource {
        fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RawLog {
                message: format!("log of {}", request.report_id),
                severity: "INFO".to_string(),
                parent_id: Some(request.report_id.clone()),
            }])
        }
    }

    /// Blocks each report id until the test releases it.
    struct GatedSource {
        gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
    }

    impl LogSource for GatedSource {
        fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
            let gate = self.gates.lock().unwrap().remove(&request.report_id);
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            Ok(vec![RawLog {
                message: request.report_id.clone(),
                severity: "ERROR".to_string(),
                parent_id: None,
            }])
        }
    }

    struct PanickingSource;

    impl LogSource for PanickingSource {
        fn fetch_logs(&self, _request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
            panic!("backend exploded");
        }
    }

    fn info() -> BTreeSet<SeverityName> {
        [SeverityName::Info].into_iter().collect()
    }

    #[test]
    fn test_empty_severity_filter_never_calls_source() {
        let source = Arc::new(CountingSource::default());
        let mut fetcher = LogFetchCoordinator::new(source.clone());
        let outcome = fetcher.refresh("x", ReportKind::Node, &BTreeSet::new(), None);
        assert_eq!(outcome, RefreshOutcome::Cleared);
        assert!(fetcher.poll().is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(!fetcher.is_loading());
    }

    #[test]
    fn test_result_is_delivered_and_mapped() {
        let source = Arc::new(CountingSource::default());
        let mut fetcher = LogFetchCoordinator::new(source.clone());
        fetcher.refresh("x", ReportKind::Node, &info(), Some("log"));
        let events = fetcher.wait(WAIT);
        assert_eq!(events.len(), 1);
        match &events[0] {
            FetchEvent::Loaded { ticket, logs } => {
                assert_eq!(ticket.report_id, "x");
                assert_eq!(logs[0].severity, SeverityName::Info);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!fetcher.is_loading());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_result_for_previous_selection_is_discarded() {
        let (release_x, gate_x) = mpsc::channel();
        let source = Arc::new(GatedSource {
            gates: Mutex::new([("x".to_string(), gate_x)].into_iter().collect()),
        });
        let mut fetcher = LogFetchCoordinator::new(source);

        fetcher.refresh("x", ReportKind::Node, &info(), None);
        fetcher.refresh("y", ReportKind::Node, &info(), None);

        let events = fetcher.wait(WAIT);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], FetchEvent::Loaded { ticket, .. } if ticket.report_id == "y"));

        release_x.send(()).unwrap();
        let deadline = Instant::now() + WAIT;
        while fetcher.in_flight() > 0 && Instant::now() < deadline {
            assert!(fetcher.poll().is_empty(), "stale x result must not be committed");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(fetcher.in_flight(), 0);
    }

    #[test]
    fn test_older_request_for_same_report_is_stale() {
        let mut fetcher = LogFetchCoordinator::new(Arc::new(CountingSource::default()));
        let RefreshOutcome::Requested(first) =
            fetcher.refresh("x", ReportKind::Node, &info(), None)
        else {
            panic!("expected a request");
        };
        fetcher.refresh("x", ReportKind::Node, &info(), Some("text"));
        assert!(fetcher.commit(first, Ok(Vec::new())).is_none());
    }

    #[test]
    fn test_panicking_source_reports_worker_lost() {
        let mut fetcher = LogFetchCoordinator::new(Arc::new(PanickingSource));
        fetcher.refresh("x", ReportKind::Global, &info(), None);
        let events = fetcher.wait(WAIT);
        assert!(matches!(
            &events[0],
            FetchEvent::Failed {
                error: FetchError::WorkerLost { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_set_source_invalidates_outstanding_request() {
        let mut fetcher = LogFetchCoordinator::new(Arc::new(CountingSource::default()));
        let RefreshOutcome::Requested(ticket) =
            fetcher.refresh("x", ReportKind::Node, &info(), None)
        else {
            panic!("expected a request");
        };
        fetcher.set_source(Arc::new(CountingSource::default()));
        assert!(!fetcher.is_loading());
        assert!(fetcher.commit(ticket, Ok(Vec::new())).is_none());
    }
}
