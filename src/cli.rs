use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use twobox_core::co2::Co2Scenario;
use twobox_core::parameters::ModelParameters;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Two-box (tropics / extra-tropics) energy-balance climate model"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Integrate the model and save its time series.
    Run(RunArgs),
    /// Summarise a run previously saved to disk.
    Summary(SummaryArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a TOML configuration file. Missing values take their defaults.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the output directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the run length in model years.
    #[arg(short, long, value_name = "YEARS")]
    pub years: Option<f64>,

    /// Override the timestep in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub dt: Option<f64>,

    /// Override the random seed.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override the amplitude of the initial temperature noise (K).
    #[arg(long, value_name = "K")]
    pub ic: Option<f64>,

    /// Override the CO2 scenario: none, linear or exp.
    #[arg(long, value_name = "SCENARIO")]
    pub co2: Option<Co2Scenario>,

    /// Override the final CO2 concentration (ppm).
    #[arg(long, value_name = "PPM")]
    pub co2_final: Option<f64>,

    /// Turn the water vapour feedback on.
    #[arg(long)]
    pub feedback: bool,
}

impl RunArgs {
    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply(&self, parameters: &mut ModelParameters) {
        if let Some(output) = &self.output {
            parameters.output.directory = output.clone();
        }
        if let Some(years) = self.years {
            parameters.time.years = years;
            parameters.time.n_steps = None;
        }
        if let Some(dt) = self.dt {
            parameters.time.dt = dt;
        }
        if let Some(seed) = self.seed {
            parameters.initial.seed = seed;
        }
        if let Some(ic) = self.ic {
            parameters.initial.ic = ic;
        }
        if let Some(scenario) = self.co2 {
            parameters.co2.scenario = scenario;
        }
        if let Some(target) = self.co2_final {
            parameters.co2.target = target;
        }
        if self.feedback {
            parameters.water_vapour_feedback = true;
        }
    }
}

/// Arguments for the `summary` subcommand.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Directory holding box1.out, box2.out and global.out.
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,

    /// Configuration the run was made with, for emission temperatures and constants.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::parse_from([
            "twobox", "-v", "run", "--years", "2", "--seed", "7", "--co2", "exp", "--feedback",
            "-o", "out/",
        ]);
        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("Expected the run subcommand");
        };

        let mut parameters = ModelParameters::default();
        parameters.time.n_steps = Some(5);
        args.apply(&mut parameters);

        assert_eq!(parameters.time.years, 2.0);
        assert_eq!(parameters.time.n_steps, None);
        assert_eq!(parameters.time.n_steps(), 720);
        assert_eq!(parameters.initial.seed, 7);
        assert_eq!(parameters.co2.scenario, Co2Scenario::Exponential);
        assert!(parameters.water_vapour_feedback);
        assert_eq!(parameters.output.directory, PathBuf::from("out/"));
    }

    #[test]
    fn test_no_overrides_keep_configuration() {
        let mut parameters = ModelParameters::default();
        RunArgs::default().apply(&mut parameters);
        assert_eq!(parameters, ModelParameters::default());
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let result = Cli::try_parse_from(["twobox", "run", "--co2", "cubic"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_arguments() {
        let cli = Cli::parse_from(["twobox", "summary", "control/", "--json"]);
        let Commands::Summary(args) = cli.command else {
            panic!("Expected the summary subcommand");
        };
        assert_eq!(args.directory, PathBuf::from("control/"));
        assert!(args.json);
        assert!(args.config.is_none());
    }
}
