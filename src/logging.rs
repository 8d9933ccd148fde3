//! Diagnostic tracing for the agent.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The status lines
//! and the final run report printed by [`crate::ui`] go to stdout and are
//! always shown.

use std::io::{self, Write};

use indicatif::ProgressBar;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Defaults to `warn` when `RUST_LOG` is unset.
///
/// Every log line is written while `spinner` is suspended, so it never lands
/// in the middle of a redraw.
///
/// ```bash
/// RUST_LOG=parsesmith=info parsesmith --target icici
/// ```
pub fn init(spinner: ProgressBar) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let writer = move || SuspendingWriter::new(spinner.clone(), io::stderr());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).compact())
        .init();
}

/// Writes to `inner` with the progress bar cleared from the terminal.
pub struct SuspendingWriter<W> {
    pb: ProgressBar,
    inner: W,
}

impl<W> SuspendingWriter<W> {
    pub fn new(pb: ProgressBar, inner: W) -> Self {
        Self { pb, inner }
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pb.suspend(|| self.inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.pb.suspend(|| self.inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_lines_pass_through_a_ticking_spinner_intact() {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        pb.enable_steady_tick(Duration::from_millis(1));
        let buf = SharedBuf::default();

        let sink = buf.clone();
        let spinner = pb.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || SuspendingWriter::new(spinner.clone(), sink.clone()))
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("first line");
            tracing::error!("second line");
        });
        pb.finish_and_clear();

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{out}");
        assert!(lines[0].ends_with("first line"), "{out}");
        assert!(lines[1].ends_with("second line"), "{out}");
    }

    #[test]
    fn flush_reaches_inner_writer() {
        let mut w = SuspendingWriter::new(ProgressBar::hidden(), Vec::new());
        w.write_all(b"partial").unwrap();
        w.flush().unwrap();
        assert_eq!(w.inner, b"partial");
    }
}
