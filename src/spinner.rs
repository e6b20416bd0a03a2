//! Progress indicator shown while a question is waiting on the service.
//!
//! The spinner owns its output line until [`Spinner::stop`] returns, at
//! which point the line has been cleared. Anything else that writes to
//! the same stream (log lines in particular) must wait for that.

use std::future::Future;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// Erase the current line and return to column 0.
pub const CLEAR_LINE: &str = "\x1b[2K\r";

/// Where spinner frames are drawn. Shared so tests can inspect it.
pub type SpinnerOutput = Arc<Mutex<dyn Write + Send>>;

/// Spinner output on stderr, keeping answers on stdout clean when piped.
pub fn stderr_output() -> SpinnerOutput {
    Arc::new(Mutex::new(io::stderr()))
}

pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl Spinner {
    /// Start drawing `message` to `output` in a background task.
    pub fn start(message: &str, output: SpinnerOutput) -> Self {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                draw(&output, &format!("{CLEAR_LINE}{frame} {message}"));

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
            }
            draw(&output, CLEAR_LINE);
        });

        Self {
            handle,
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner. The line is cleared once this returns.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

/// Await `fut`, showing a spinner on `output` if one is given. The
/// spinner line is gone before the result is handed back.
pub async fn spin_while<F: Future>(
    message: &str,
    output: Option<&SpinnerOutput>,
    fut: F,
) -> F::Output {
    let spinner = output.map(|out| Spinner::start(message, out.clone()));
    let result = fut.await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }
    result
}

fn draw(output: &SpinnerOutput, text: &str) {
    // A poisoned or broken terminal only costs us the animation
    if let Ok(mut out) = output.lock() {
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}
