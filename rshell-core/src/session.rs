//! Drives a yamux connection over an established [`rshell_proto::Transport`]
//! and tags streams with a [`StreamKind`] on the way in and out.
//!
//! `yamux` 0.13 exposes only a poll-based `Connection` — no `Control`
//! handle, no internal driver task of its own — so whichever side needs
//! to open streams while also staying responsive to inbound ones has to
//! own the `Connection` exclusively and drive it from one place.

use futures::future::poll_fn;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use yamux::{Config, Connection, ConnectionError, Mode, Stream};

use crate::cancel::CancelToken;
use crate::state::SessionError;
use crate::stream_kind::StreamKind;

fn yamux_config() -> Config {
    Config::default()
}

enum Command {
    Open(oneshot::Sender<Result<Stream, ConnectionError>>),
    Close(oneshot::Sender<()>),
}

/// The implant side: dials out, then actively opens both logical
/// streams. Yamux calls the side that opens streams the "client"
/// regardless of which end initiated the TCP connection.
///
/// A background task owns the `Connection` and polls it continuously;
/// `open_stream`/`close` send requests over a channel rather than
/// touching the connection directly, since only one place may poll it
/// at a time.
pub struct ClientSession {
    commands: mpsc::UnboundedSender<Command>,
    driver: JoinHandle<()>,
}

impl ClientSession {
    /// Take ownership of an established transport and start driving the
    /// multiplexer in the background. `cancel` lets the caller tear the
    /// driver down from elsewhere; the driver also cancels it if the
    /// connection dies on its own, so every other worker waiting on the
    /// same token wakes up too.
    pub fn new<T>(transport: T, cancel: CancelToken) -> Self
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let mut connection = Connection::new(transport.compat(), yamux_config(), Mode::Client);
        let (commands, mut rx) = mpsc::unbounded_channel::<Command>();
        let driver = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = rx.recv() => match cmd {
                        Some(Command::Open(reply)) => {
                            let outcome = poll_fn(|cx| connection.poll_new_outbound(cx)).await;
                            let _ = reply.send(outcome);
                        }
                        Some(Command::Close(reply)) => {
                            let _ = poll_fn(|cx| connection.poll_close(cx)).await;
                            let _ = reply.send(());
                            break;
                        }
                        None => break,
                    },
                    inbound = poll_fn(|cx| connection.poll_next_inbound(cx)) => match inbound {
                        Some(Ok(_stream)) => {
                            log::debug!("client session received unexpected inbound stream");
                        }
                        Some(Err(e)) => {
                            log::warn!("yamux driver error: {e}");
                            break;
                        }
                        None => break,
                    },
                }
            }
            cancel.cancel();
        });
        Self { commands, driver }
    }

    /// Open one logical stream and write its one-byte tag.
    pub async fn open_stream(&mut self, kind: StreamKind) -> Result<Stream, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands.send(Command::Open(reply)).map_err(|_| SessionError::Cancelled)?;
        let mut stream = response.await.map_err(|_| SessionError::Cancelled)??;
        use futures::io::AsyncWriteExt as _;
        stream
            .write_all(&[kind.tag()])
            .await
            .map_err(|e| SessionError::Proto(rshell_proto::ProtoError::Io(e)))?;
        Ok(stream)
    }

    pub async fn close(self) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::Close(reply)).is_ok() {
            let _ = response.await;
        }
        let _ = self.driver.await;
        Ok(())
    }
}

/// The listener side: accepts both logical streams opened by the
/// implant and sorts them by their leading tag byte.
pub struct ServerSession<T> {
    connection: Connection<Compat<T>>,
}

impl<T> ServerSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(transport: T) -> Self {
        let connection = Connection::new(transport.compat(), yamux_config(), Mode::Server);
        Self { connection }
    }

    /// Accept the next inbound stream and read back its tag. Returns
    /// `Ok(None)` once the peer has closed the connection and no more
    /// streams will ever arrive.
    pub async fn accept_stream(&mut self) -> Result<Option<(StreamKind, Stream)>, SessionError> {
        let connection = &mut self.connection;
        let Some(mut stream) =
            poll_fn(|cx| connection.poll_next_inbound(cx)).await.transpose()?
        else {
            return Ok(None);
        };
        use futures::io::AsyncReadExt as _;
        let mut tag = [0u8; 1];
        stream
            .read_exact(&mut tag)
            .await
            .map_err(|e| SessionError::Proto(rshell_proto::ProtoError::Io(e)))?;
        let kind = StreamKind::try_from(tag[0]).map_err(SessionError::UnknownStreamTag)?;
        Ok(Some((kind, stream)))
    }
}
