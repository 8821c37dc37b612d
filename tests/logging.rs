use std::io;
use std::sync::{Arc, Mutex};

use descent::config::TrainConfig;
use descent::model::Scale;
use descent::tensor;
use descent::train::train;
use tracing_subscriber::fmt::MakeWriter;

/// Collects everything the fmt subscriber writes.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture<T>(max_level: tracing::Level, f: impl FnOnce() -> T) -> (T, String) {
    let out = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(out.clone())
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, out.text())
}

#[test]
fn default_reporter_logs_progress_and_stop_at_info() {
    let config = TrainConfig::default().with_learning_rate(0.1).with_verbose(1);
    let mut model = Scale::new(0.0);

    let (report, logs) = capture(tracing::Level::INFO, || {
        train(&tensor!([1.0, 2.0, 3.0]), &tensor!([2.0, 4.0, 6.0]), &mut model, &config).unwrap()
    });

    assert!(report.converged());
    let lines: Vec<&str> = logs.lines().collect();
    let first = lines.first().expect("no log output");
    assert!(first.contains("INFO"), "{first}");
    assert!(first.contains("descent::train"), "{first}");
    assert!(first.contains("epoch 0: loss 18.6667"), "{first}");

    let last = lines.last().unwrap();
    assert!(last.contains("INFO"), "{last}");
    assert!(last.contains("descent::train"), "{last}");
    assert!(last.contains("stopping early at epoch"), "{last}");

    let progress = lines.iter().filter(|l| l.contains(": loss ")).count();
    assert_eq!(progress, report.state.iterations - 1);
    assert!(!logs.contains("DEBUG"));
}

#[test]
fn verbose_zero_writes_no_info_lines() {
    let config = TrainConfig::default().with_learning_rate(0.1).with_verbose(0);
    let mut model = Scale::new(0.0);

    let (report, logs) = capture(tracing::Level::INFO, || {
        train(&tensor!([1.0, 2.0, 3.0]), &tensor!([2.0, 4.0, 6.0]), &mut model, &config).unwrap()
    });

    assert!(report.converged());
    assert!(logs.is_empty(), "{logs}");
}

#[test]
fn start_and_finish_are_debug_records() {
    let config = TrainConfig::default().with_max_epochs(2).with_verbose(0);

    let (_, logs) = capture(tracing::Level::DEBUG, || {
        train(&tensor!([1.0]), &tensor!([2.0]), &mut Scale::new(0.0), &config).unwrap()
    });

    assert!(logs.contains("DEBUG"));
    assert!(logs.contains("starting training"));
    assert!(logs.contains("training finished"));
    assert!(!logs.contains("INFO"));
}
