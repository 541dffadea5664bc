use anyhow::Result;
use clap::Parser;
use gasfit::{cli::Cli, pipeline};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        std::process::exit(gasfit::cli::parse_exit_code(&err));
    });

    let Some(input) = args.input.as_deref() else {
        println!("{}", gasfit::cli::USAGE);
        println!("\nExample: gasfit gas_benchmark_results.csv");
        std::process::exit(1);
    };

    init_tracing(args.debug);

    let config = args.to_config()?;
    let stdout = std::io::stdout();
    pipeline::run(&config, input, &mut stdout.lock())?;

    Ok(())
}
