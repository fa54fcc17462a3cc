//! CLI entry point for keystroke-dispatch
//!
//! Provides a command-line interface for listing bindings, checking them
//! for conflicts, and replaying recorded key events against them.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use keystroke_dispatch::config::{BindingsFile, EventScript};
use keystroke_dispatch::core::{KeyboardDispatcher, Platform, ScriptStep};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "keystroke-dispatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bindings
    List {
        /// Path to the bindings file
        #[arg(short, long, default_value = "~/.config/keystroke-dispatch/bindings.conf")]
        bindings: PathBuf,
    },

    /// Check for triggers bound to more than one action
    Check {
        /// Path to the bindings file
        #[arg(short, long, default_value = "~/.config/keystroke-dispatch/bindings.conf")]
        bindings: PathBuf,
    },

    /// Replay an event script and show which actions fire
    Replay {
        /// Path to the bindings file
        #[arg(short, long, default_value = "~/.config/keystroke-dispatch/bindings.conf")]
        bindings: PathBuf,

        /// Path to the event script
        #[arg(short, long)]
        script: PathBuf,

        /// Platform whose meta key mapping to use (defaults to the host)
        #[arg(short, long, value_enum)]
        platform: Option<PlatformArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Macos,
    Windows,
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Macos => Platform::MacOS,
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Other => Platform::Other,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List { bindings } => list_bindings(&bindings)?,
        Commands::Check { bindings } => check_conflicts(&bindings)?,
        Commands::Replay {
            bindings,
            script,
            platform,
        } => {
            let platform = platform.map(Platform::from).unwrap_or_else(Platform::current);
            replay_script(&bindings, &script, platform)?;
        }
    }

    Ok(())
}

/// Expand a leading tilde in a user-supplied path
fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// List all bindings in the file
fn list_bindings(bindings_path: &Path) -> anyhow::Result<()> {
    let file = BindingsFile::load(expand(bindings_path)?)?;

    println!("{}", format!("Bindings from: {}\n", file.path().display()).bold());

    for binding in file.bindings() {
        println!(
            "{} {} → {}",
            format!("{:>4}", binding.line).dimmed(),
            format!("{}", binding.trigger).cyan().bold(),
            binding.action.green()
        );
    }

    println!("\n{} Total: {} bindings", "✓".green(), file.bindings().len());

    Ok(())
}

/// Check the bindings file for conflicts
fn check_conflicts(bindings_path: &Path) -> anyhow::Result<()> {
    let file = BindingsFile::load(expand(bindings_path)?)?;

    println!("{} Parsing bindings: {}", "→".cyan(), file.path().display());
    println!("{} Found {} bindings\n", "✓".green(), file.bindings().len());

    let conflicts = file.conflicts();

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} conflict{}:\n",
        "✗".red().bold(),
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" }
    );

    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "{} {}",
            format!("Conflict {}", i + 1).yellow().bold(),
            format!("{}", conflict.trigger).cyan()
        );

        for (idx, binding) in conflict.conflicting_bindings.iter().enumerate() {
            println!(
                "  {} {} (line {})",
                format!("{}.", idx + 1).dimmed(),
                binding.action.magenta(),
                binding.line
            );
        }
        println!();
    }

    println!("{}", "⚠ These actions fire together on the same key!".yellow());
    std::process::exit(1);
}

/// Replay an event script against the bindings file
fn replay_script(
    bindings_path: &Path,
    script_path: &Path,
    platform: Platform,
) -> anyhow::Result<()> {
    let file = BindingsFile::load(expand(bindings_path)?)?;
    let script = EventScript::load(expand(script_path)?)?;

    let keyboard = KeyboardDispatcher::new(platform);
    let fired: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let registered = file.apply(&keyboard, move |action, _| sink.lock().push(action.to_string()));

    println!(
        "{} Replaying {} step(s) on {} with {} binding(s)\n",
        "→".cyan(),
        script.steps().len(),
        platform.to_string().bold(),
        registered
    );

    for (step, report) in script.replay(&keyboard) {
        let actions: Vec<String> = fired.lock().drain(..).collect();

        match step {
            ScriptStep::Down(_) => {
                println!("{} {}", format!("{}", step).cyan(), fired_label(&actions));
            }
            ScriptStep::Up(_) | ScriptStep::Reset => println!("{}", format!("{}", step).dimmed()),
        }

        if let Some(report) = report {
            if report.failed > 0 {
                println!("  {} {} callback(s) failed", "✗".red(), report.failed);
            }
        }
    }

    println!(
        "\n{} Final keystroke: {}",
        "✓".green(),
        format!("{}", keyboard.current_key_stroke()).bold()
    );

    Ok(())
}

fn fired_label(actions: &[String]) -> ColoredString {
    if actions.is_empty() {
        "(nothing)".dimmed()
    } else {
        format!("→ {}", actions.join(", ")).green()
    }
}
