//! Line source for the pipeline
//!
//! Reading stdin blocks and cannot be cancelled, so it runs on a plain thread
//! that forwards lines over a channel. The process can exit while the thread
//! is still parked in a read.

use std::io::BufRead;
use tokio::sync::mpsc;

pub const LINE_CHANNEL_CAPACITY: usize = 64;

/// Forward every line of `reader` to the returned receiver. The channel closes
/// at end of input or on a read error.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input line");
                    break;
                }
            }
        }
    });
    rx
}

/// Line reader over the process's standard input
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}
