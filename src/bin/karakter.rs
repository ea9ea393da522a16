use clap::Parser;
use log::LevelFilter;

use karakter::app::App;
use karakter::cli::Cli;
use karakter::config::EngineConfig;
use karakter::llm::LlmConfig;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    // Environment first, then CLI overrides.
    let engine_config =
        EngineConfig::from_env().with_overrides(cli.seed, cli.no_synthesis, cli.history_dir);
    let llm_config = LlmConfig::from_env();

    let app = App::new(engine_config, llm_config);
    if let Err(err) = app.run(cli.command) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
