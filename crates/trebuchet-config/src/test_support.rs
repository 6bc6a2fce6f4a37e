//! Log capture shared by unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("buffer mutex poisoned").clone();
        String::from_utf8(bytes).expect("log output is UTF-8")
    }
}

impl io::Write for Buffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("buffer mutex poisoned")
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `emit` under a plain-text subscriber and returns what it logged.
pub(crate) fn capture_logs<R>(emit: impl FnOnce() -> R) -> (R, String) {
    let buffer = Buffer::default();
    let sink = buffer.clone();
    let subscriber = fmt::Subscriber::builder()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, emit);
    (result, buffer.contents())
}
