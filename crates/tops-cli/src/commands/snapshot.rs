use anyhow::Result;
use tops_algo::transforms::{CoordinateSnapshot, FrameView};
use tops_cli::common::{emit, fmt_num, write_table, OutputFormat};
use tops_core::Degrees;
use tracing::info;

fn row(signal: &str, view: &FrameView) -> Vec<String> {
    let mut row = vec![signal.to_string()];
    row.extend(
        [
            view.abc.a,
            view.abc.b,
            view.abc.c,
            view.alphabeta.alpha,
            view.alphabeta.beta,
            view.dq.d,
            view.dq.q,
        ]
        .into_iter()
        .map(fmt_num),
    );
    row
}

pub fn handle(
    time: f64,
    vm: f64,
    im: f64,
    phase_deg: f64,
    f_n: f64,
    format: OutputFormat,
) -> Result<()> {
    let phase = Degrees(phase_deg).to_radians().value();
    let snapshot = CoordinateSnapshot::at(time, vm, im, phase, f_n);
    info!(time, theta = snapshot.theta, "coordinate snapshot");

    emit(format, &snapshot, |w| {
        write_table(
            &["SIGNAL", "A", "B", "C", "ALPHA", "BETA", "D", "Q"],
            &[
                row("voltage", &snapshot.voltage),
                row("current", &snapshot.current),
            ],
            w,
        )
    })
}
