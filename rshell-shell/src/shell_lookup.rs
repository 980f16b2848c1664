//! Picks a shell binary to run under the PTY.

/// Preference order for the interactive shell, matching what the
/// original implant tried via `exec.LookPath`.
const CANDIDATES: &[&str] = &["bash", "ksh", "zsh", "sh"];

/// Find the first available shell on `PATH`, in preference order.
///
/// Returns `None` if none of [`CANDIDATES`] can be found — this host has
/// no usable interactive shell.
pub fn find_shell() -> Option<std::path::PathBuf> {
    CANDIDATES.iter().find_map(|name| which::which(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_posix_shell_on_any_unix_test_runner() {
        // `sh` is POSIX-mandated, so this should never come back empty
        // on the Linux/macOS runners this crate targets.
        assert!(find_shell().is_some());
    }
}
