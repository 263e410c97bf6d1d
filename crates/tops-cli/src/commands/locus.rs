use anyhow::{bail, Result};
use serde::Serialize;
use tops_algo::small_signal::{
    linspace, RootLocusPoint, SmallSignalStabilityAnalyzer, SweepParameter,
};
use tops_cli::cli::MachineArgs;
use tops_cli::common::{emit, fmt_num, write_table, OutputFormat};
use tops_cli::config::TopsConfig;
use tracing::info;

use super::resolve_solver;

pub struct SweepRequest<'a> {
    pub parameter: &'a str,
    pub from: f64,
    pub to: f64,
    pub steps: usize,
}

#[derive(Serialize)]
struct LocusOutput {
    parameter: SweepParameter,
    points: Vec<RootLocusPoint>,
    /// (σ, ω) outline of the poorly damped electromechanical region
    band_boundary: Vec<(f64, f64)>,
}

pub fn handle(
    machine: &MachineArgs,
    sweep: &SweepRequest<'_>,
    solver: Option<&str>,
    config: &TopsConfig,
    format: OutputFormat,
) -> Result<()> {
    if sweep.steps == 0 {
        bail!("--steps must be at least 1");
    }
    let parameter: SweepParameter = sweep.parameter.parse()?;
    let analyzer = SmallSignalStabilityAnalyzer::new()
        .with_solver(resolve_solver(solver, config)?)
        .with_band(config.band);

    let values = linspace(sweep.from, sweep.to, sweep.steps);
    let points = analyzer.root_locus(&machine.parameters(), parameter, &values)?;
    info!(
        parameter = parameter.symbol(),
        from = sweep.from,
        to = sweep.to,
        points = points.len(),
        "root locus"
    );

    let output = LocusOutput {
        parameter,
        band_boundary: config.band.boundary(20),
        points,
    };
    emit(format, &output, |w| {
        let rows: Vec<_> = output
            .points
            .iter()
            .map(|p| {
                vec![
                    fmt_num(p.value),
                    p.eigenvalues[0].to_string(),
                    p.eigenvalues[1].to_string(),
                ]
            })
            .collect();
        write_table(&[parameter.symbol(), "LAMBDA_1", "LAMBDA_2"], &rows, w)
    })
}
