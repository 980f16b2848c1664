//! Wires a dialed connection to a local PTY running the system shell.
//!
//! `portable-pty`'s reader/writer handles are synchronous, so they're
//! each driven from a dedicated blocking task; a pair of channels bridge
//! them to the async multiplexed stream.

use std::fmt;
use std::sync::{Arc, Mutex};

use portable_pty::{CommandBuilder, PtySize, native_pty_system};
use rshell_core::{CancelToken, ClientSession, StreamKind};
use rshell_proto::resize::read_resize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::compat::FuturesAsyncReadCompatExt;

use crate::shell_lookup::find_shell;

/// Errors from [`run`].
#[derive(Debug)]
pub enum DriverError {
    NoShellFound,
    Connect(std::io::Error),
    Pty(Box<dyn std::error::Error + Send + Sync>),
    Session(rshell_core::SessionError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoShellFound => write!(f, "no usable shell found on PATH"),
            Self::Connect(e) => write!(f, "could not connect to listener: {e}"),
            Self::Pty(e) => write!(f, "pty error: {e}"),
            Self::Session(e) => write!(f, "session error: {e}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<rshell_core::SessionError> for DriverError {
    fn from(e: rshell_core::SessionError) -> Self {
        Self::Session(e)
    }
}

/// Dial `addr`, authenticate with `password`, and run an interactive
/// shell over the connection until the peer disconnects.
pub async fn run(addr: &str, password: &str) -> Result<(), DriverError> {
    let shell_path = find_shell().ok_or(DriverError::NoShellFound)?;
    log::info!("using shell: {}", shell_path.display());

    let stream = TcpStream::connect(addr).await.map_err(DriverError::Connect)?;
    log::info!("connected to {addr}");

    let transport = rshell_proto::establish(stream, password)
        .await
        .map_err(rshell_core::SessionError::from)?;
    log::info!("handshake complete");

    let cancel = CancelToken::new();
    let mut session = ClientSession::new(transport, cancel.clone());

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize { rows: 24, cols: 80, pixel_width: 0, pixel_height: 0 })
        .map_err(|e| DriverError::Pty(e.into()))?;

    let mut cmd = CommandBuilder::new(&shell_path);
    if let Ok(cwd) = std::env::current_dir() {
        cmd.cwd(cwd);
    }
    let child = pair.slave.spawn_command(cmd).map_err(|e| DriverError::Pty(e.into()))?;
    drop(pair.slave);
    let child = Arc::new(Mutex::new(child));

    let master = Arc::new(Mutex::new(pair.master));
    let mut pty_reader =
        master.lock().unwrap().try_clone_reader().map_err(|e| DriverError::Pty(e.into()))?;
    let mut pty_writer =
        master.lock().unwrap().take_writer().map_err(|e| DriverError::Pty(e.into()))?;

    let pty_stream = session.open_stream(StreamKind::Pty).await?;
    let control_stream = session.open_stream(StreamKind::ResizeControl).await?;
    let mut control_stream = control_stream.compat();
    let (mut net_reader, mut net_writer) = futures::io::AsyncReadExt::split(pty_stream);

    let (from_pty_tx, mut from_pty_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let (to_pty_tx, to_pty_rx) = std::sync::mpsc::channel::<Vec<u8>>();

    let pty_read_thread = tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; 8192];
        loop {
            match std::io::Read::read(&mut pty_reader, &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if from_pty_tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let pty_write_thread = tokio::task::spawn_blocking(move || {
        while let Ok(chunk) = to_pty_rx.recv() {
            if std::io::Write::write_all(&mut pty_writer, &chunk).is_err() {
                break;
            }
        }
    });

    let to_pty = {
        let cancel = cancel.clone();
        async move {
            use futures::io::AsyncReadExt as _;
            let mut buf = [0u8; 8192];
            loop {
                let n = match net_reader.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                if to_pty_tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            cancel.cancel();
        }
    };

    let from_pty = {
        let cancel = cancel.clone();
        async move {
            use futures::io::AsyncWriteExt as _;
            while let Some(chunk) = from_pty_rx.recv().await {
                if net_writer.write_all(&chunk).await.is_err() {
                    break;
                }
            }
            cancel.cancel();
        }
    };

    let shell_reaper = {
        let cancel = cancel.clone();
        let child = child.clone();
        async move {
            loop {
                let done = child.lock().unwrap().try_wait().ok().flatten().is_some();
                if done {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            cancel.cancel();
        }
    };

    let resize_loop = {
        let cancel = cancel.clone();
        let master = master.clone();
        async move {
            loop {
                let record = tokio::select! {
                    r = read_resize(&mut control_stream) => r,
                    _ = cancel.cancelled() => break,
                };
                match record {
                    Ok(Some(record)) => {
                        let size = PtySize {
                            rows: record.rows,
                            cols: record.cols,
                            pixel_width: record.x_pixels,
                            pixel_height: record.y_pixels,
                        };
                        if let Ok(m) = master.lock() {
                            let _ = m.resize(size);
                        }
                    }
                    Ok(None) | Err(_) => break,
                }
            }
            cancel.cancel();
        }
    };

    tokio::select! {
        _ = to_pty => {}
        _ = from_pty => {}
        _ = shell_reaper => {}
        _ = resize_loop => {}
        _ = cancel.cancelled() => {}
    }

    {
        let mut child = child.lock().unwrap();
        let _ = child.kill();
        let _ = child.wait();
    }
    drop(pty_read_thread);
    drop(pty_write_thread);
    session.close().await?;
    Ok(())
}
