//! The one-byte tag written as the first byte of every multiplexed
//! stream, identifying what it carries.

/// Which logical channel a yamux stream carries.
///
/// Yamux itself is untyped — it just hands back byte streams — so the
/// application layer tags each stream with one of these as its very
/// first byte, on both the open and the accept side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// The interactive PTY: shell stdin/stdout/stderr, merged.
    Pty,
    /// Resize records flowing from the listener to the shell.
    ResizeControl,
}

impl StreamKind {
    pub fn tag(self) -> u8 {
        match self {
            Self::Pty => 0x01,
            Self::ResizeControl => 0x02,
        }
    }
}

impl TryFrom<u8> for StreamKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Pty),
            0x02 => Ok(Self::ResizeControl),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips() {
        for kind in [StreamKind::Pty, StreamKind::ResizeControl] {
            assert_eq!(StreamKind::try_from(kind.tag()), Ok(kind));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(StreamKind::try_from(0xFF), Err(0xFF));
    }
}
