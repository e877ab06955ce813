use std::error::Error as StdError;

use tracing::{error, info};

/// Message shown while an action is in flight.
pub const BUSY_MESSAGE: &str = "Processing your request...";

/// Fire-and-forget sink for busy indication and diagnostics.
pub trait ProgressSink: Send + Sync {
    fn show_busy(&self, message: &str);
    fn clear_busy(&self);
    fn log_error(&self, context: &str, error: &(dyn StdError + 'static));
}

/// Shows the busy indicator on creation and clears it exactly once on drop,
/// whichever way the surrounding scope exits.
#[must_use = "dropping the guard clears the busy indicator immediately"]
pub struct BusyGuard<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> BusyGuard<'a> {
    pub fn show(sink: &'a dyn ProgressSink, message: &str) -> Self {
        sink.show_busy(message);
        Self { sink }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.sink.clear_busy();
    }
}

/// Emits progress and diagnostics as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn show_busy(&self, message: &str) {
        info!(message, "busy");
    }

    fn clear_busy(&self) {
        info!("idle");
    }

    fn log_error(&self, context: &str, err: &(dyn StdError + 'static)) {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        error!(context, error = %err, ?causes, "action failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn show_busy(&self, message: &str) {
            self.events.lock().unwrap().push(format!("show:{message}"));
        }

        fn clear_busy(&self) {
            self.events.lock().unwrap().push("clear".into());
        }

        fn log_error(&self, context: &str, _error: &(dyn StdError + 'static)) {
            self.events.lock().unwrap().push(format!("error:{context}"));
        }
    }

    fn guarded(sink: &RecordingSink, fail: bool) -> Result<(), std::fmt::Error> {
        let _busy = BusyGuard::show(sink, BUSY_MESSAGE);
        if fail {
            return Err(std::fmt::Error);
        }
        Ok(())
    }

    #[test]
    fn guard_clears_on_every_exit_path() {
        let sink = RecordingSink::default();
        guarded(&sink, false).unwrap();
        guarded(&sink, true).unwrap_err();
        let events = sink.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                format!("show:{BUSY_MESSAGE}"),
                "clear".to_string(),
                format!("show:{BUSY_MESSAGE}"),
                "clear".to_string(),
            ]
        );
    }

    #[test]
    fn guard_clears_on_unwind() {
        let sink = RecordingSink::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _busy = BusyGuard::show(&sink, "panicking");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(sink.events.lock().unwrap().last().unwrap(), "clear");
    }
}
