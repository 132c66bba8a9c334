//! Dependency checks behind the `check` subcommand.
//!
//! Verifies that the required media tools are installed and that credentials
//! are configured for the stages that need them.

use crate::config::Config;
use std::process::Command;

/// Outcome of probing one tool.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Runs and reports a version
    Ok,
    /// Not on PATH
    NotFound,
    /// Present but misbehaving
    Warning(String),
}

/// Probe a tool by running its version flag.
///
/// ffmpeg and ffprobe take `-version`, yt-dlp takes `--version`, so the flag
/// is passed per tool.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!(
            "'{}' found but {} failed",
            command, version_flag
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Run all dependency checks and print results.
pub fn check_dependencies(config: &Config) {
    println!("Checking dependencies...\n");

    print!("ffmpeg (chunk extraction): ");
    let ffmpeg_ok = match check_command("ffmpeg", "-version") {
        CheckResult::Ok => {
            println!("✓ OK");
            true
        }
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  Install: sudo apt install ffmpeg  (Debian/Ubuntu)");
            println!("           sudo pacman -S ffmpeg    (Arch)");
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
    };

    print!("ffprobe (duration probe): ");
    match check_command("ffprobe", "-version") {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound => {
            println!("✗ NOT FOUND (ships with ffmpeg)");
            println!("  Without it every source runs as unknown duration, capped at");
            println!("  {} chunks.", config.audio.max_chunks);
        }
        CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
    }

    print!("yt-dlp (audio download): ");
    let ytdlp_ok = match check_command("yt-dlp", "--version") {
        CheckResult::Ok => {
            println!("✓ OK");
            true
        }
        CheckResult::NotFound => {
            println!("- not installed");
            println!("  Only needed for remote video sources; local files work without it.");
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
    };

    println!();
    println!("Credentials:");

    print!("  recognizer.api_key: ");
    let recognizer_ok = config.recognizer_key().is_ok();
    if recognizer_ok {
        println!("✓ set");
    } else {
        println!("✗ missing");
    }

    print!("  translate.api_key:  ");
    if config.translate_key().is_ok() {
        println!("✓ set");
    } else if config.translate.enabled {
        println!("✗ missing (translation is enabled)");
    } else {
        println!("- not set (translation is disabled)");
    }

    print!("  review.api_key:     ");
    if config.review_key().is_ok() {
        println!("✓ set");
    } else {
        println!("- not set (caption review unavailable)");
    }

    println!();
    if ffmpeg_ok && recognizer_ok {
        println!("✓ Ready to transcribe local sources.");
        if ytdlp_ok {
            println!("✓ Ready to download and transcribe remote sources.");
        }
    }
    if !ffmpeg_ok {
        println!("⚠ Transcription cannot run without ffmpeg.");
    }
    if !recognizer_ok {
        println!("⚠ Set recognizer.api_key (or POLYSUB_SPEECH_API_KEY) before transcribing.");
    }
}
