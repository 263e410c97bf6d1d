use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::common::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tops",
    author,
    version,
    about = "Power-system stability numerics: transforms, eigen analysis, equal-area criterion, Bode",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Configuration file (defaults to ~/.tops/config.toml when present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clarke (abc → αβ) and Park (αβ → dq) transform of one sample
    Transform {
        /// Phase a value
        #[arg(long, allow_hyphen_values = true)]
        a: f64,
        /// Phase b value
        #[arg(long, allow_hyphen_values = true)]
        b: f64,
        /// Phase c value
        #[arg(long, allow_hyphen_values = true)]
        c: f64,
        /// Rotation angle of the dq frame (rad)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        theta: f64,
    },
    /// Balanced voltage and current in abc, αβ and dq at one instant
    Snapshot {
        /// Time (s)
        #[arg(long, default_value_t = 0.0)]
        time: f64,
        /// Voltage peak
        #[arg(long, default_value_t = 1.0)]
        vm: f64,
        /// Current peak
        #[arg(long, default_value_t = 0.8)]
        im: f64,
        /// Current phase relative to the voltage (degrees, negative = lagging)
        #[arg(long, default_value_t = -20.0, allow_hyphen_values = true)]
        phase_deg: f64,
        /// Nominal frequency (Hz)
        #[arg(long, default_value_t = 50.0)]
        f_n: f64,
    },
    /// Eigenvalues, damping and mode class of the linearized swing equation
    Eigen {
        #[command(flatten)]
        machine: MachineArgs,
        /// Eigen solver backend (closed-form, faer); overrides the config file
        #[arg(long)]
        solver: Option<String>,
    },
    /// Root locus while sweeping H, D or K
    Locus {
        #[command(flatten)]
        machine: MachineArgs,
        /// Swept coefficient: H, D or K
        #[arg(long, default_value = "D")]
        sweep: String,
        /// First value of the sweep
        #[arg(long, allow_hyphen_values = true)]
        from: f64,
        /// Last value of the sweep
        #[arg(long, allow_hyphen_values = true)]
        to: f64,
        /// Number of sweep points
        #[arg(long, default_value_t = 11)]
        steps: usize,
        /// Eigen solver backend; overrides the config file
        #[arg(long)]
        solver: Option<String>,
    },
    /// Equal-area criterion for a fault cleared at a given rotor angle
    Eac {
        /// Mechanical input power P_m (p.u.)
        #[arg(long, default_value_t = 0.8, allow_hyphen_values = true)]
        p_m: f64,
        /// Internal EMF |E| (p.u.)
        #[arg(long, default_value_t = 1.1)]
        e: f64,
        /// Infinite-bus voltage |Vs| (p.u.)
        #[arg(long, default_value_t = 1.0)]
        vs: f64,
        /// Total transient reactance x_dt (p.u.)
        #[arg(long, default_value_t = 0.3)]
        x_dt: f64,
        /// Clearing angle δ_clear (rad)
        #[arg(long, default_value_t = 1.2)]
        delta_clear: f64,
        /// Electrical power during the fault (p.u.)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        p_e_sc: f64,
        /// Also print the power-angle curve with this many samples over [0, π]
        #[arg(long)]
        curve: Option<usize>,
    },
    /// Frequency response of the open loop, with and without hydro governor
    Bode {
        #[command(flatten)]
        machine: MachineArgs,
        /// Water starting time T_w (s)
        #[arg(long, default_value_t = 2.0)]
        tw: f64,
        /// Governor gain K_gov
        #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
        kgov: f64,
        /// Lowest frequency as a power of ten (rad/s); overrides the config file
        #[arg(long, allow_hyphen_values = true)]
        start_exp: Option<f64>,
        /// Highest frequency as a power of ten (rad/s); overrides the config file
        #[arg(long, allow_hyphen_values = true)]
        stop_exp: Option<f64>,
        /// Number of frequency points; overrides the config file
        #[arg(long)]
        points: Option<usize>,
        /// Print only the stability margins
        #[arg(long)]
        margins_only: bool,
    },
    /// Steady-state phasor diagram of a machine on an infinite bus
    Phasor {
        /// Active power (p.u.)
        #[arg(long, default_value_t = 0.8, allow_hyphen_values = true)]
        p: f64,
        /// Reactive power (p.u.)
        #[arg(long, default_value_t = 0.2, allow_hyphen_values = true)]
        q: f64,
        /// Infinite-bus voltage (p.u.)
        #[arg(long, default_value_t = 1.0)]
        vs: f64,
        /// Synchronous d-axis reactance
        #[arg(long, default_value_t = 1.8)]
        xd: f64,
        /// Transient d-axis reactance
        #[arg(long, default_value_t = 0.3)]
        xd_t: f64,
        /// Synchronous q-axis reactance
        #[arg(long, default_value_t = 1.7)]
        xq: f64,
        /// Transformer reactance
        #[arg(long, default_value_t = 0.15)]
        xt: f64,
        /// Line reactance
        #[arg(long, default_value_t = 0.3)]
        xl: f64,
    },
}

/// Swing-equation coefficients shared by `eigen`, `locus` and `bode`.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct MachineArgs {
    /// Inertia constant H (s)
    #[arg(long, default_value_t = 6.5, allow_hyphen_values = true)]
    pub h: f64,
    /// Damping coefficient D
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub d: f64,
    /// Synchronizing power coefficient K (p.u./rad)
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub k: f64,
    /// Nominal frequency f_N (Hz)
    #[arg(long, default_value_t = 50.0)]
    pub f_n: f64,
}

impl MachineArgs {
    pub fn parameters(&self) -> tops_core::MachineSwingParameters {
        tops_core::MachineSwingParameters::new(self.h, self.d, self.k, self.f_n)
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["tops", "eigen", "--d", "2", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Eigen { machine, solver } => {
                assert_eq!(machine.d, 2.0);
                assert_eq!(machine.h, 6.5);
                assert!(solver.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn negative_values_are_accepted() {
        let cli = Cli::try_parse_from([
            "tops", "transform", "--a", "-0.5", "--b", "1", "--c", "-0.5", "--theta", "-1.2",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Transform { a, .. } if a == -0.5));
    }
}
