use clap::Parser;
use covertype_cli::{cli::Cli, commands};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment variable
    // for log control. `COVERTYPE_LOG` can still tune individual crates, e.g.
    // `COVERTYPE_LOG=covertype::history=debug covertype -q history list`.
    let env_filter = EnvFilter::builder()
        .with_env_var("COVERTYPE_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let (stderr_layer, file_layer) = match &cli.logfile {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    let config = commands::load_config(&cli)?;
    debug!(?config, ?cli);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli, &config, &mut out)
}
