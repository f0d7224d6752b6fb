mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Commands, RunArgs, SummaryArgs};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use twobox::driver;
use twobox_components::analysis::{first_non_finite_row, RunSummary};
use twobox_core::parameters::ModelParameters;
use twobox_core::persistence;
use twobox_core::state::Region;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("twobox v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Summary(args) => summary(args),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_parameters(path: Option<&std::path::Path>) -> Result<ModelParameters> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            Ok(ModelParameters::from_file(path)?)
        }
        None => Ok(ModelParameters::default()),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut parameters = load_parameters(args.config.as_deref())?;
    args.apply(&mut parameters);

    let outcome = driver::run(parameters)?;
    if let Some(found) = &outcome.non_finite {
        warn!(
            "{} {} became non-finite at step {}; the saved series contain NaN or infinite values",
            found.region, found.variable, found.index
        );
    }
    println!(
        "Saved {} timesteps to {}",
        outcome.model.n_steps() + 1,
        outcome.output.display()
    );
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let parameters = load_parameters(args.config.as_deref())?;
    let te = [
        parameters.emission_temperature(Region::Tropics),
        parameters.emission_temperature(Region::ExtraTropics),
    ];
    let saved = persistence::load(&args.directory, te)?;
    info!(
        directory = %args.directory.display(),
        rows = saved.len(),
        "Loaded saved run"
    );

    if let Some(row) = first_non_finite_row(&saved.tropics, &saved.extratropics, &saved.global) {
        warn!(row, "Saved run contains non-finite values");
    }

    let summary = RunSummary::from_states(
        &saved.tropics,
        &saved.extratropics,
        &saved.global,
        &parameters.constants,
        saved.len(),
    )
    .ok_or_else(|| {
        CliError::Argument(format!(
            "'{}' does not contain any timesteps",
            args.directory.display()
        ))
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }
    Ok(())
}
