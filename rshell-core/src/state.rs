//! Pure state machines for connection and session lifecycle.
//!
//! Kept free of any I/O so the transition logic can be unit tested
//! directly: callers drive these with events as they observe them and
//! branch on the resulting state, rather than the state machine ever
//! reaching out to poll a socket itself.

use std::fmt;

/// Lifecycle of the raw transport, from dial/accept through to the
/// point the multiplexer takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Handshaking,
    Established,
    Closed,
}

/// Events that drive [`ConnectionState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    TcpConnected,
    HandshakeOk,
    HandshakeFailed,
    Disconnected,
}

impl ConnectionState {
    /// Apply `event`, returning the new state. An event that makes no
    /// sense in the current state (e.g. `HandshakeOk` while `Closed`)
    /// leaves the state unchanged rather than panicking — callers log a
    /// mismatch but the state machine itself never rejects an event.
    pub fn apply(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent as E;
        use ConnectionState as S;
        match (self, event) {
            (S::Connecting, E::TcpConnected) => S::Handshaking,
            (S::Handshaking, E::HandshakeOk) => S::Established,
            (S::Handshaking, E::HandshakeFailed) => S::Closed,
            (_, E::Disconnected) => S::Closed,
            (other, _) => other,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Handshaking => "handshaking",
            Self::Established => "established",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle of one interactive session once the transport is
/// established: PTY allocated, running, or torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingStreams,
    Active,
    Ending,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StreamsReady,
    CancelRequested,
    PeerClosed,
}

impl SessionState {
    pub fn apply(self, event: SessionEvent) -> Self {
        use SessionEvent as E;
        use SessionState as S;
        match (self, event) {
            (S::AwaitingStreams, E::StreamsReady) => S::Active,
            (S::Active, E::CancelRequested) => S::Ending,
            (S::Active, E::PeerClosed) => S::Ending,
            (S::Ending, _) => S::Ended,
            (other, _) => other,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingStreams => "awaiting-streams",
            Self::Active => "active",
            Self::Ending => "ending",
            Self::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

/// Errors surfaced by session setup and coordination, above the
/// transport/protocol layer's own error types.
#[derive(Debug)]
pub enum SessionError {
    Proto(rshell_proto::ProtoError),
    Multiplex(yamux::ConnectionError),
    /// A peer opened a stream tagged with a byte we don't recognize.
    UnknownStreamTag(u8),
    /// The session was torn down by its own cancellation token before
    /// setup finished.
    Cancelled,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proto(e) => write!(f, "transport error: {e}"),
            Self::Multiplex(e) => write!(f, "multiplexer error: {e}"),
            Self::UnknownStreamTag(tag) => write!(f, "unknown stream tag: 0x{tag:02x}"),
            Self::Cancelled => write!(f, "session cancelled"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<rshell_proto::ProtoError> for SessionError {
    fn from(e: rshell_proto::ProtoError) -> Self {
        Self::Proto(e)
    }
}

impl From<yamux::ConnectionError> for SessionError {
    fn from(e: yamux::ConnectionError) -> Self {
        Self::Multiplex(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_happy_path() {
        let s = ConnectionState::Connecting;
        let s = s.apply(ConnectionEvent::TcpConnected);
        assert_eq!(s, ConnectionState::Handshaking);
        let s = s.apply(ConnectionEvent::HandshakeOk);
        assert_eq!(s, ConnectionState::Established);
    }

    #[test]
    fn disconnect_always_closes() {
        for s in [
            ConnectionState::Connecting,
            ConnectionState::Handshaking,
            ConnectionState::Established,
        ] {
            assert_eq!(s.apply(ConnectionEvent::Disconnected), ConnectionState::Closed);
        }
    }

    #[test]
    fn session_happy_path() {
        let s = SessionState::AwaitingStreams;
        let s = s.apply(SessionEvent::StreamsReady);
        assert_eq!(s, SessionState::Active);
        let s = s.apply(SessionEvent::CancelRequested);
        assert_eq!(s, SessionState::Ending);
        let s = s.apply(SessionEvent::PeerClosed);
        assert_eq!(s, SessionState::Ended);
    }
}
