use anyhow::Result;
use clap::{CommandFactory, Parser};
use polysub::PolysubError;
use polysub::app::{
    TranscribeOverrides, apply_overrides, run_captions_command, run_transcribe_command,
};
use polysub::cli::{Cli, Commands, ConfigAction};
use polysub::config::Config;
use polysub::diagnostics::check_dependencies;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let Some(source) = cli.source else {
                eprintln!("No source given.");
                eprintln!("Usage: polysub <URL or audio file> [options]");
                eprintln!("Run `polysub --help` for the full option list.");
                std::process::exit(2);
            };

            let mut config = load_config(cli.config.as_deref())?;
            let overrides = TranscribeOverrides {
                target_lang: cli.target_lang,
                no_translate: cli.no_translate,
                chunk_secs: cli.chunk_secs,
                overlap_secs: cli.overlap_secs,
                max_chunks: cli.max_chunks,
                output_dir: cli.output_dir,
            };
            apply_overrides(&mut config, &overrides);

            run_transcribe_command(
                config,
                &source,
                cli.deadline,
                cli.json,
                cli.quiet,
                cli.verbose,
            )
            .await?;
        }
        Some(Commands::Captions {
            video,
            review,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            run_captions_command(config, &video, review, json, cli.quiet).await?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            check_dependencies(&config);
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "polysub",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Resolve the effective configuration.
///
/// An explicit `--config` path must exist and parse. Otherwise the default
/// location is read when present and built-in defaults are used when not,
/// with environment overrides applied last in both cases.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path()),
    };
    Ok(config.with_env_overrides())
}

fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    let config_path = custom_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path).with_env_overrides();
            match config.get_value_by_path(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => exit_config_error(e),
            }
        }
        ConfigAction::Set { key, value } => {
            Config::set_value_by_path(&config_path, &key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::List { section } => {
            let config = Config::load_or_default(&config_path).with_env_overrides();
            let rendered = match section.as_deref() {
                Some(name) => config.display_section(name),
                None => config.to_display_toml(),
            };
            match rendered {
                Ok(toml) => print!("{}", toml),
                Err(e) => exit_config_error(e),
            }
        }
        ConfigAction::Dump => print!("{}", Config::dump_template()),
    }
    Ok(())
}

fn exit_config_error(e: PolysubError) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1)
}
