//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the command handlers.

use crate::commands;
use crate::logging;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal microphone recorder with a live waveform and a queue of timed clips
#[derive(Parser)]
#[command(name = "clipdeck")]
#[command(version)]
#[command(long_about = "A terminal microphone recorder with a live waveform and a queue of timed clips.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n    Record options (-d, -t) can be used without explicitly saying 'record'.\n\nEXAMPLES:\n    # Record with the configured microphone\n    $ clipdeck\n\n    # Record from the second device with 30 second clips\n    $ clipdeck record -d 1 -t 30\n\n    # Start/stop recording from another program\n    $ pkill -USR1 clipdeck")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/clipdeck/clipdeck.toml\n    Logs:               ~/.local/state/clipdeck/clipdeck.log.*"
)]
struct Cli {
    #[command(flatten)]
    record: RecordArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct RecordArgs {
    /// Input device: "default", a name or an index from `clipdeck list-devices`
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,

    /// Initial clip length in seconds (clamped to 1-300)
    #[arg(short = 't', long, value_name = "SECS", global = true)]
    duration: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the recorder (default)
    ///
    /// r/Enter record or stop, digits edit the duration, ←/→ switch microphone,
    /// ↑/↓ select a clip, p play, s save, x delete, q/Esc quit.
    #[command(visible_alias = "r")]
    Record,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the input device in clipdeck.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   clipdeck completions bash > clipdeck.bash
    ///   clipdeck completions zsh > _clipdeck
    ///   clipdeck completions fish > clipdeck.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "clipdeck", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record) => {
            let RecordArgs { device, duration } = cli.record;
            commands::handle_record(device, duration).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
