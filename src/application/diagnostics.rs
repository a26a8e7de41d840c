// Diagnostics collaborator - Where dropped samples are reported
use crate::domain::error::IngestError;

pub trait DiagnosticSink: Send {
    fn report(&self, error: &IngestError);
}

/// Reports through the process log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, error: &IngestError) {
        match error {
            IngestError::Malformed(reason) => {
                tracing::warn!(%reason, "dropping malformed telemetry sample");
            }
            IngestError::OutOfOrder { received, latest } => {
                tracing::warn!(%received, %latest, "dropping out-of-order telemetry sample");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Keeps every reported error for inspection.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingDiagnostics {
        pub(crate) reports: Arc<Mutex<Vec<IngestError>>>,
    }

    impl RecordingDiagnostics {
        pub(crate) fn reported(&self) -> Vec<IngestError> {
            self.reports.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingDiagnostics {
        fn report(&self, error: &IngestError) {
            self.reports.lock().unwrap().push(error.clone());
        }
    }
}
