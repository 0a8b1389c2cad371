//! Quiet access to the audio host.

use anyhow::{anyhow, Result};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Runs `f` with stderr pointed at /dev/null.
///
/// ALSA prints probe warnings for every unusable PCM while devices are
/// enumerated or opened; they would scribble over the terminal UI.
#[cfg(target_os = "linux")]
pub(crate) fn quiet_host<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(saved) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    Ok(result)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn quiet_host<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    Ok(f())
}
