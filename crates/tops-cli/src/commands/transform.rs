use anyhow::Result;
use serde::Serialize;
use tops_algo::transforms::{abc_to_alphabeta, alphabeta_to_dq};
use tops_cli::common::{emit, fmt_num, write_table, OutputFormat};
use tops_core::{AlphaBetaQuantity, DqQuantity, ThreePhaseQuantity};
use tracing::info;

#[derive(Serialize)]
struct TransformOutput {
    theta: f64,
    abc: ThreePhaseQuantity,
    alphabeta: AlphaBetaQuantity,
    dq: DqQuantity,
}

pub fn handle(a: f64, b: f64, c: f64, theta: f64, format: OutputFormat) -> Result<()> {
    let abc = ThreePhaseQuantity::new(a, b, c);
    let alphabeta = abc_to_alphabeta(&abc);
    let dq = alphabeta_to_dq(&alphabeta, theta);
    info!(theta, magnitude = alphabeta.magnitude(), "transformed abc sample");

    let output = TransformOutput {
        theta,
        abc,
        alphabeta,
        dq,
    };
    emit(format, &output, |w| {
        let rows = [
            ("a", abc.a),
            ("b", abc.b),
            ("c", abc.c),
            ("alpha", alphabeta.alpha),
            ("beta", alphabeta.beta),
            ("d", dq.d),
            ("q", dq.q),
        ]
        .iter()
        .map(|(name, value)| vec![name.to_string(), fmt_num(*value)])
        .collect::<Vec<_>>();
        write_table(&["COMPONENT", "VALUE"], &rows, w)
    })
}
