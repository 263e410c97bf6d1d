use anyhow::Result;
use tops_cli::cli::Commands;
use tops_cli::common::OutputFormat;
use tops_cli::config::TopsConfig;

pub mod bode;
pub mod eac;
pub mod eigen;
pub mod locus;
pub mod phasor;
pub mod snapshot;
pub mod transform;

pub fn handle(command: &Commands, config: &TopsConfig, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Transform { a, b, c, theta } => transform::handle(*a, *b, *c, *theta, format),
        Commands::Snapshot {
            time,
            vm,
            im,
            phase_deg,
            f_n,
        } => snapshot::handle(*time, *vm, *im, *phase_deg, *f_n, format),
        Commands::Eigen { machine, solver } => {
            eigen::handle(machine, solver.as_deref(), config, format)
        }
        Commands::Locus {
            machine,
            sweep,
            from,
            to,
            steps,
            solver,
        } => locus::handle(
            machine,
            &locus::SweepRequest {
                parameter: sweep,
                from: *from,
                to: *to,
                steps: *steps,
            },
            solver.as_deref(),
            config,
            format,
        ),
        Commands::Eac { .. } => eac::handle(command, config, format),
        Commands::Bode { .. } => bode::handle(command, config, format),
        Commands::Phasor { .. } => phasor::handle(command, format),
    }
}

/// CLI flag first, then the config file.
pub fn resolve_solver(
    flag: Option<&str>,
    config: &TopsConfig,
) -> Result<tops_core::EigenSolverKind> {
    Ok(match flag {
        Some(name) => name.parse()?,
        None => config.eigen.solver,
    })
}
