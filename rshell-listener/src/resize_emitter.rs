//! Watches the operator's terminal for size changes (SIGWINCH) and
//! forwards them to the shell as resize records.

use std::time::Duration;

use rshell_core::CancelToken;
use rshell_proto::resize::{ResizeRecord, write_resize};
use tokio::io::AsyncWrite;
use tokio::signal::unix::{SignalKind, signal};

/// Coalescing window: a burst of resize events (dragging a window's
/// edge fires many SIGWINCHes) collapses into one record sent after
/// things settle, rather than one record per signal.
const COALESCE_WINDOW: Duration = Duration::from_millis(50);

fn current_size() -> ResizeRecord {
    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    ResizeRecord { rows, cols, x_pixels: 0, y_pixels: 0 }
}

/// Send the current terminal size once, then keep sending updates as
/// SIGWINCH fires until `cancel` trips or the control stream breaks.
pub async fn run<W: AsyncWrite + Unpin>(mut control_stream: W, cancel: CancelToken) {
    if write_resize(&mut control_stream, current_size()).await.is_err() {
        return;
    }

    let mut winch = match signal(SignalKind::window_change()) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("could not install SIGWINCH handler: {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            recv = winch.recv() => {
                if recv.is_none() {
                    return;
                }
                loop {
                    tokio::select! {
                        _ = winch.recv() => continue,
                        _ = tokio::time::sleep(COALESCE_WINDOW) => break,
                    }
                }
                if write_resize(&mut control_stream, current_size()).await.is_err() {
                    return;
                }
            }
        }
    }
}
