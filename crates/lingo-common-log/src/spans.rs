//! Span helpers for catalog work.

use tracing::{info_span, Span};

/// Create a span for reading or writing a catalog file.
pub fn catalog_span(operation: &str, path: &str) -> Span {
    info_span!("catalog", op = %operation, path = %path, error = tracing::field::Empty)
}

/// Create a span for a language switch.
pub fn locale_span(locale: &str) -> Span {
    info_span!("locale", code = %locale, error = tracing::field::Empty)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
        duration
    }
}

/// Macro for timing a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}

/// Re-export of tracing::instrument for convenience.
pub use tracing::instrument;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    // Run `f` with a subscriber that captures output
    fn with_subscriber<F>(f: F) -> String
    where
        F: FnOnce(),
    {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn test_span_nesting() {
        let output = with_subscriber(|| {
            let locale = locale_span("zh_CN");
            let _guard1 = locale.enter();

            let catalog = catalog_span("read", "translations/RedPandaIDE_zh_CN.ts");
            let _guard2 = catalog.enter();

            tracing::info!("nested operation");
        });
        assert!(output.contains("locale{code=zh_CN}"));
        assert!(output.contains("catalog{op=read path=translations/RedPandaIDE_zh_CN.ts}"));
        assert!(output.contains("nested operation"));
    }

    #[test]
    fn test_error_recording() {
        let output = with_subscriber(|| {
            let span = catalog_span("read", "missing.ts");
            let _guard = span.enter();

            let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
            record_error(&error);

            tracing::warn!("catalog unavailable");
        });
        assert!(output.contains("error=file not found"));
    }

    #[test]
    fn test_timer() {
        let output = with_subscriber(|| {
            let timer = Timer::start("parse");
            std::thread::sleep(std::time::Duration::from_millis(2));
            assert!(timer.finish() >= std::time::Duration::from_millis(2));
        });
        assert!(output.contains("operation completed"));
        assert!(output.contains("operation=parse"));
    }

    #[test]
    fn test_timed_macro() {
        let output = with_subscriber(|| {
            let result = timed!("index", { 2 + 2 });
            assert_eq!(result, 4);
        });
        assert!(output.contains("operation=index"));
    }
}
