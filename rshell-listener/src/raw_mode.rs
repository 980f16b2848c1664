//! RAII guard for the operator's local terminal raw mode.

/// Puts the local terminal into raw mode for the lifetime of the guard.
///
/// Raw mode is what lets every keystroke — including control characters
/// like Ctrl-C — reach the remote shell instead of being intercepted
/// locally. Dropping the guard always attempts to restore cooked mode,
/// even on an early return or panic unwind.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> std::io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            log::warn!("failed to restore terminal mode: {e}");
        }
    }
}
