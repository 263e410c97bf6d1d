use anyhow::{bail, Result};
use serde::Serialize;
use tops_algo::loop_model::{
    combined, governor_transfer_function, logspace, open_loop_transfer_function,
    stability_margins, FrequencyPoint, StabilityMargins, TransferFunction,
};
use tops_cli::cli::Commands;
use tops_cli::common::{emit, fmt_num, fmt_opt, write_table, OutputFormat};
use tops_cli::config::{BodeConfig, TopsConfig};
use tracing::{debug, info};

#[derive(Serialize)]
struct LoopResponse {
    transfer_function: String,
    margins: StabilityMargins,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    response: Vec<FrequencyPoint>,
}

impl LoopResponse {
    fn sweep(tf: &TransferFunction, omegas: &[f64], keep_points: bool) -> Result<Self> {
        let response = tf.bode(omegas)?;
        let margins = stability_margins(&response);
        debug!(name = %tf.name, ?margins, "bode sweep");
        Ok(Self {
            transfer_function: tf.to_string(),
            margins,
            response: if keep_points { response } else { Vec::new() },
        })
    }
}

#[derive(Serialize)]
struct BodeOutput {
    open_loop: LoopResponse,
    governor: String,
    with_governor: LoopResponse,
}

fn margin_rows(label: &str, margins: &StabilityMargins) -> Vec<String> {
    vec![
        label.to_string(),
        fmt_opt(margins.gain_margin_db),
        fmt_opt(margins.phase_crossover),
        fmt_opt(margins.phase_margin_deg),
        fmt_opt(margins.gain_crossover),
    ]
}

pub fn handle(command: &Commands, config: &TopsConfig, format: OutputFormat) -> Result<()> {
    let Commands::Bode {
        machine,
        tw,
        kgov,
        start_exp,
        stop_exp,
        points,
        margins_only,
    } = command
    else {
        bail!("bode handler called with {command:?}");
    };

    let sweep = BodeConfig {
        start_exponent: start_exp.unwrap_or(config.bode.start_exponent),
        stop_exponent: stop_exp.unwrap_or(config.bode.stop_exponent),
        points: points.unwrap_or(config.bode.points),
    };
    sweep.validate()?;
    let omegas = logspace(sweep.start_exponent, sweep.stop_exponent, sweep.points);

    let h_ol = open_loop_transfer_function(machine.h, machine.d, machine.f_n, machine.k)?;
    let gov = governor_transfer_function(*tw, *kgov)?;
    let h_gov = combined(&h_ol, &gov)?;

    let keep_points = !*margins_only;
    let output = BodeOutput {
        open_loop: LoopResponse::sweep(&h_ol, &omegas, keep_points)?,
        governor: gov.to_string(),
        with_governor: LoopResponse::sweep(&h_gov, &omegas, keep_points)?,
    };
    info!(
        points = omegas.len(),
        phase_margin = ?output.with_governor.margins.phase_margin_deg,
        gain_margin = ?output.with_governor.margins.gain_margin_db,
        "frequency response"
    );

    emit(format, &output, |w| {
        let rows = [
            margin_rows(&h_ol.name, &output.open_loop.margins),
            margin_rows(&h_gov.name, &output.with_governor.margins),
        ];
        write_table(
            &["LOOP", "GM [dB]", "W_PC [rad/s]", "PM [deg]", "W_GC [rad/s]"],
            &rows,
            &mut *w,
        )?;
        if *margins_only {
            return Ok(());
        }

        writeln!(w)?;
        let rows: Vec<_> = output
            .open_loop
            .response
            .iter()
            .zip(&output.with_governor.response)
            .map(|(ol, gov)| {
                vec![
                    fmt_num(ol.omega),
                    fmt_num(ol.magnitude_db),
                    fmt_num(ol.phase_deg),
                    fmt_num(gov.magnitude_db),
                    fmt_num(gov.phase_deg),
                ]
            })
            .collect();
        write_table(
            &["OMEGA [rad/s]", "OL [dB]", "OL [deg]", "OL+GOV [dB]", "OL+GOV [deg]"],
            &rows,
            w,
        )
    })
}
