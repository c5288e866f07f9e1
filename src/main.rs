// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   Reset | Rebase | Repos | Options | Configs | Version
//! ```

use std::process::ExitCode;

use armada::cli::global::GlobalOptions;
use armada::cli::{self, Command};
use armada::cmd::rebase::run_rebase_command;
use armada::cmd::repos::run_repos_command;
use armada::cmd::reset::run_reset_command;
use armada::config::Config;
use armada::config::loader::ConfigLoader;
use armada::logging::init_logging;
use armada::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli).await
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

async fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => load_config(&cli.global).map(|config| {
            for line in config.format_options() {
                println!("{line}");
            }
        }),
        Some(Command::Configs) => {
            let loader = build_config_loader(&cli.global);
            match loader {
                Ok(loader) => {
                    for line in loader.format_loaded_files() {
                        println!("{line}");
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Command::Repos) => load_config(&cli.global).and_then(|config| run_repos_command(&config)),
        Some(Command::Reset(args)) => match load_config(&cli.global) {
            Ok(config) => run_reset_command(args, &config).await,
            Err(e) => Err(e),
        },
        Some(Command::Rebase(args)) => match load_config(&cli.global) {
            Ok(config) => run_rebase_command(args, &config).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> armada::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional("armada.toml");
    }
    for config_path in &global.configs {
        loader = loader.add_toml_file(config_path);
    }
    loader = loader.with_env_prefix("ARMADA");
    for (key, value) in global.to_config_overrides() {
        loader = loader.set(&key, value)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> armada::error::Result<Config> {
    let loader = build_config_loader(global)?;
    loader.build().map_err(|e| {
        eprintln!("Failed to load config: {e}");
        e
    })
}
