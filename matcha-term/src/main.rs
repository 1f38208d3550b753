//! matcha: a minimal graphical terminal emulator.

mod app;
mod config;
mod event;
mod font;
mod glyph_cache;
mod input;
mod renderer;
mod terminal;

use std::path::PathBuf;
use std::process;

use config::{CliArgs, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HELP_TEXT: &str = r#"matcha - a minimal graphical terminal emulator

USAGE:
    matcha [OPTIONS]

OPTIONS:
    -c, --config <PATH>   Path to config file (default: ~/.config/matcha/config.toml)
    -s, --shell <SHELL>   Shell to run (default: /bin/sh)
    -f, --font <PATH>     Monospace TTF to use instead of the discovered one
    -h, --help            Print help information
    -V, --version         Print version information

ENVIRONMENT VARIABLES:
    MATCHA_SHELL          Override the shell
    MATCHA_TERM           Override the TERM value exported to the child
    MATCHA_FONT           Override the font path
"#;

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut cli_args = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("matcha {VERSION}");
                process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--config requires a path argument".to_string())?;
                cli_args.config_path = Some(PathBuf::from(path));
            }
            "-s" | "--shell" => {
                i += 1;
                let shell = args
                    .get(i)
                    .ok_or_else(|| "--shell requires a shell argument".to_string())?;
                cli_args.shell = Some(shell.clone());
            }
            "-f" | "--font" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--font requires a path argument".to_string())?;
                cli_args.font = Some(PathBuf::from(path));
            }
            arg => {
                return Err(format!("unknown option: {arg}. Use --help for usage."));
            }
        }
        i += 1;
    }

    Ok(cli_args)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let config = match Config::load_with_args(&cli_args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            process::exit(1);
        }
    };

    log::info!("starting matcha {} with shell {}", VERSION, config.shell);

    if let Err(e) = app::run(config) {
        log::error!("{e}");
        process::exit(1);
    }
}
