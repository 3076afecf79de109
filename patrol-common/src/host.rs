//! Host-platform guard.
//!
//! The automation drives a desktop browser, so only the three desktop
//! platforms are supported. The check runs once at process start; the binary
//! maps a failure to exit status 1.

use crate::PatrolError;

/// Platforms we can drive a browser on, as `std::env::consts::OS` spells them.
pub const SUPPORTED: &[&str] = &["linux", "macos", "windows"];

/// Validate an arbitrary platform string against [`SUPPORTED`].
pub fn check(os: &str) -> crate::Result<()> {
    if SUPPORTED.contains(&os) {
        Ok(())
    } else {
        Err(PatrolError::UnsupportedPlatform(os.to_string()))
    }
}

/// Validate the platform this process is running on.
pub fn ensure_supported() -> crate::Result<&'static str> {
    check(std::env::consts::OS)?;
    Ok(std::env::consts::OS)
}

/// Clear the terminal, best effort. Failures are logged and ignored; a dirty
/// screen is not worth interrupting the polling loop for.
pub fn clear_screen() {
    let status = if std::env::consts::OS == "windows" {
        std::process::Command::new("cmd").args(["/C", "cls"]).status()
    } else {
        std::process::Command::new("clear").status()
    };
    if let Err(e) = status {
        tracing::debug!(error = %e, "could not clear screen");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_platforms_pass() {
        for os in ["linux", "macos", "windows"] {
            assert!(check(os).is_ok(), "{os} should be supported");
        }
    }

    #[test]
    fn exotic_platform_is_rejected() {
        let err = check("plan9").unwrap_err();
        assert!(matches!(err, PatrolError::UnsupportedPlatform(ref os) if os == "plan9"));
    }

    #[test]
    fn current_host_is_supported() {
        // CI and dev machines are all desktop platforms.
        assert!(ensure_supported().is_ok());
    }
}
