//! Saving clips to disk and handing them to the system audio player.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Download file name: `audio-clip-YYYYMMDDTHHMMSS.wav` in UTC.
pub fn download_file_name(at: &DateTime<Utc>) -> String {
    format!("audio-clip-{}.wav", at.format("%Y%m%dT%H%M%S"))
}

/// Directory used when no download directory is configured.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes clip audio into `dir`, creating it if needed.
///
/// An existing file with the same name gets a numeric suffix rather than
/// being overwritten.
///
/// # Errors
/// - If the directory cannot be created
/// - If the file cannot be written
pub fn save_clip(audio: &[u8], dir: &Path, at: &DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| anyhow!("Failed to create {}: {e}", dir.display()))?;

    let file_name = download_file_name(at);
    let mut path = dir.join(&file_name);
    let mut suffix = 1;
    while path.exists() {
        let stem = file_name.trim_end_matches(".wav");
        path = dir.join(format!("{stem}-{suffix}.wav"));
        suffix += 1;
    }

    fs::write(&path, audio).map_err(|e| anyhow!("Failed to write {}: {e}", path.display()))?;
    tracing::info!("Clip saved: {} ({} bytes)", path.display(), audio.len());
    Ok(path)
}

/// Launches audio playback of a file.
pub trait AudioPlayer {
    /// Starts playing `path` without waiting for it to finish.
    fn play(&mut self, path: &Path) -> Result<()>;
}

/// The desktop's audio player.
///
/// On macOS: uses `open`.
/// On Linux: tries xdg-open first, then mpv, vlc, ffplay and paplay.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPlayer;

impl AudioPlayer for SystemPlayer {
    fn play(&mut self, path: &Path) -> Result<()> {
        launch_player(path)
    }
}

/// Writes clip audio to `dir` for an external player to open.
///
/// # Errors
/// - If the file cannot be written
pub fn write_playback_file(audio: &[u8], dir: &Path, clip_number: u64) -> Result<PathBuf> {
    let path = dir.join(format!(
        "clipdeck_{}_{}.wav",
        std::process::id(),
        clip_number
    ));
    fs::write(&path, audio).map_err(|e| anyhow!("Failed to write {}: {e}", path.display()))?;
    tracing::debug!("Playback file written: {}", path.display());
    Ok(path)
}

/// Deletes a playback file. A file that is already gone is fine.
pub fn remove_playback_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Playback file removed: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(target_os = "macos")]
fn launch_player(path: &Path) -> Result<()> {
    Command::new("open")
        .arg(path)
        .spawn()
        .map_err(|e| anyhow!("Failed to open audio player: {e}"))?;
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn launch_player(path: &Path) -> Result<()> {
    for player in ["xdg-open", "mpv", "vlc", "ffplay", "paplay"] {
        let mut cmd = Command::new(player);
        if player == "ffplay" {
            cmd.args(["-nodisp", "-autoexit", "-loglevel", "quiet"]);
        }
        let spawned = cmd
            .arg(path)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn();
        if spawned.is_ok() {
            tracing::info!("Playing {} with {}", path.display(), player);
            return Ok(());
        }
    }

    Err(anyhow!(
        "No audio player found. Install mpv, vlc, ffplay, or paplay"
    ))
}
