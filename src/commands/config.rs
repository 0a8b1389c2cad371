//! Configuration file editor command.
//!
//! Opens the clipdeck configuration file in the user's preferred editor,
//! writing the defaults first if it does not exist yet.

use std::process::Command;

use crate::config::{config_path, ClipdeckConfig};

/// Opens the clipdeck configuration file in `$EDITOR`, or in the first of
/// [`EDITOR_FALLBACKS`] found on `PATH`.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()?;
    if !config_path.exists() {
        ClipdeckConfig::default().save_to(&config_path)?;
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Editors tried, in order, when `$EDITOR` is unset.
const EDITOR_FALLBACKS: [&str; 2] = ["nano", "vi"];

fn find_editor() -> anyhow::Result<String> {
    choose_editor(std::env::var("EDITOR").ok(), on_path)
}

fn choose_editor(
    from_env: Option<String>,
    installed: impl Fn(&str) -> bool,
) -> anyhow::Result<String> {
    if let Some(editor) = from_env.filter(|e| !e.trim().is_empty()) {
        return Ok(editor);
    }
    EDITOR_FALLBACKS
        .iter()
        .find(|name| installed(name))
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow::anyhow!("No editor found. Set $EDITOR to edit clipdeck.toml"))
}

fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
