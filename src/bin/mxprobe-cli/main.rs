use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod output;

use args::{Cli, Commands, probe_options};
use mxprobe::{lookup_exchangers, verify_email_with_options};

fn init_logging(verbose: bool) {
    let fallback = if verbose { "mxprobe=debug" } else { "mxprobe=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = cli.parsed_format()?;

    match cli.cmd {
        Some(Commands::Verify {
            email,
            port,
            timeout_ms,
            helo,
            mail_from,
        }) => {
            let options = probe_options(port, timeout_ms, helo, mail_from);
            let result = verify_email_with_options(&email, &options)?;
            output::print_verdict(format, &email, &result)?;
            // codes de sortie : 0 accepté, 2 refusé, 1 fatal
            if !result.accepted {
                std::process::exit(2);
            }
        }
        Some(Commands::Mx { domain }) => {
            let exchangers = lookup_exchangers(&domain);
            output::print_exchangers(format, &domain, &exchangers)?;
            if exchangers.is_empty() {
                std::process::exit(2);
            }
        }
        None => {
            Cli::clap_command().print_help()?;
            println!();
        }
    }
    Ok(())
}
