//! Console and file logging for bundlegen
//!
//! Every message is appended to `bundlegen.log` in the config directory.
//! Warnings and errors always reach stderr; info and debug output only
//! shows up with `-v`.

use colored::Colorize;
use indicatif::ProgressBar;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static NO_STDERR: Mutex<bool> = Mutex::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

const LOG_FILE_NAME: &str = "bundlegen.log";

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map_or(0, |v| *v)
}

/// Set the verbosity level without touching the log file
pub fn set_verbosity(verbosity: u8) {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
}

/// Get whether console output is suppressed
pub fn get_no_stderr() -> bool {
    NO_STDERR.lock().ok().is_some_and(|v| *v)
}

/// Suppress (or restore) console output. The log file is still written.
pub fn set_no_stderr(disabled: bool) {
    if let Ok(mut v) = NO_STDERR.lock() {
        *v = disabled;
    }
}

/// Map the verbosity level onto a `tracing` filter directive
/// 0 = warn only, 1 = debug (-v), 2 = trace (-vv)
pub fn verbosity_to_filter() -> &'static str {
    match get_verbosity() {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the logger with a verbosity level
pub fn init_with_verbosity(verbosity: u8, no_stderr: bool) -> Result<(), String> {
    set_verbosity(verbosity);
    set_no_stderr(no_stderr);
    init()
}

fn init() -> Result<(), String> {
    let log_dir = get_log_dir()?;
    fs::create_dir_all(&log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let log_file = log_dir.join(LOG_FILE_NAME);

    // One log per run
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file lock poisoned".to_string())?;
    *guard = Some(log_file);

    Ok(())
}

/// Directory holding the log file. `BUNDLEGEN_LOG_DIR` overrides the default.
fn get_log_dir() -> Result<PathBuf, String> {
    if let Ok(dir) = std::env::var("BUNDLEGEN_LOG_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    #[cfg(not(target_os = "windows"))]
    let log_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("bundlegen");

    #[cfg(target_os = "windows")]
    let log_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("bundlegen");

    Ok(log_dir)
}

fn write_to_log(message: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {}", timestamp, message);
            }
        }
    }
}

fn emit(line: String) {
    if !get_no_stderr() {
        eprintln!("{}", line);
    }
}

/// Log an informational message (to console if verbose >= 1, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 {
        emit(message.to_string());
    }
}

/// Log a debug message (to console if verbose >= 1, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 {
        emit(format!("{} {}", "DEBUG:".blue().bold(), message));
    }
}

/// Log a warning message (to both file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    emit(format!("{} {}", "warning:".yellow().bold(), message));
}

/// Log an error message (to both file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    emit(format!("{} {}", "error:".red().bold(), message));
}

/// Log a success message
pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    emit(format!("{} {}", "\u{2714}".green().bold(), message));
}

/// Log a pipeline step (console only at -vv)
pub fn step(message: &str) {
    if get_verbosity() >= 2 {
        emit(format!("TRACE: {}", message));
    }
    write_to_log(&format!("STEP: {}", message));
}

/// Record a finished subprocess and its output in the log file
pub fn capture_output(command_name: &str, output: &std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    write_to_log(&format!(
        "COMMAND: {} (exit code: {:?})",
        command_name,
        output.status.code()
    ));

    if !stdout.is_empty() {
        write_to_log(&format!("  STDOUT:\n{}", stdout));
    }

    if !stderr.is_empty() {
        write_to_log(&format!("  STDERR:\n{}", stderr));
    }
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Print the log file path to the user
pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(log_dir) = get_log_dir() {
        eprintln!("Log file: {}", log_dir.join(LOG_FILE_NAME).display());
    } else {
        eprintln!("Log file location not available");
    }
}

/// Start a spinner with the given message (only if not verbose)
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 || get_no_stderr() {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut guard) = SPINNER.lock() {
        *guard = Some(spinner);
    }
}

/// Stop the spinner with an error message
pub fn spinner_error(message: &str) {
    spinner_stop();
    write_to_log(&format!("ERROR {}", message));
    emit(format!("  {} {}", "✗".red().bold(), message));
}

/// Stop the spinner without any message
pub fn spinner_stop() {
    if let Ok(mut guard) = SPINNER.lock() {
        if let Some(spinner) = guard.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter_levels() {
        set_verbosity(0);
        assert_eq!(verbosity_to_filter(), "warn");
        set_verbosity(1);
        assert_eq!(verbosity_to_filter(), "debug");
        set_verbosity(3);
        assert_eq!(verbosity_to_filter(), "trace");
        set_verbosity(0);
    }

    #[test]
    fn test_logging_without_init_does_not_panic() {
        set_no_stderr(true);
        warn("warning without a log file");
        error("error without a log file");
        spinner_stop();
        set_no_stderr(false);
    }
}
