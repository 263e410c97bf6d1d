use anyhow::Result;
use tops_algo::small_signal::{ModeClass, ModeReport, SmallSignalStabilityAnalyzer};
use tops_cli::cli::MachineArgs;
use tops_cli::common::{emit, fmt_opt, write_table, OutputFormat};
use tops_cli::config::TopsConfig;
use tracing::{info, warn};

use super::resolve_solver;

fn mode_row(mode: &ModeReport) -> Vec<String> {
    vec![
        mode.eigenvalue.to_string(),
        fmt_opt(mode.damping_ratio),
        fmt_opt(mode.frequency.map(|f| f.value())),
        mode.class.to_string(),
    ]
}

pub fn handle(
    machine: &MachineArgs,
    solver: Option<&str>,
    config: &TopsConfig,
    format: OutputFormat,
) -> Result<()> {
    let solver = resolve_solver(solver, config)?;
    let analyzer = SmallSignalStabilityAnalyzer::new()
        .with_solver(solver)
        .with_band(config.band);

    let report = analyzer.analyze(&machine.parameters())?;
    info!(
        solver = solver.as_str(),
        stable = report.is_stable(),
        "small-signal analysis complete"
    );
    if let Some(mode) = report
        .modes
        .iter()
        .find(|m| m.class == ModeClass::PoorlyDampedElectromechanical)
    {
        warn!(eigenvalue = %mode.eigenvalue, "poorly damped electromechanical mode");
    }

    emit(format, &report, |w| {
        let rows: Vec<_> = report.modes.iter().map(mode_row).collect();
        write_table(&["EIGENVALUE", "DAMPING [%]", "FREQUENCY [Hz]", "CLASS"], &rows, w)
    })
}
