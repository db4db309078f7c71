use clap::Parser;

use sotto::cli::CliArgs;

fn main() {
    let args = CliArgs::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = sotto::run(args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
