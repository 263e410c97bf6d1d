use anyhow::{bail, Result};
use serde::Serialize;
use tops_algo::phasor::SmibOperatingPoint;
use tops_cli::cli::Commands;
use tops_cli::common::{emit, fmt_num, write_table, OutputFormat};
use tops_core::PhasorKind;
use tracing::info;

#[derive(Serialize)]
struct PhasorRow {
    phasor: PhasorKind,
    re: f64,
    im: f64,
    magnitude: f64,
    angle_deg: f64,
}

#[derive(Serialize)]
struct PhasorOutput {
    operating_point: SmibOperatingPoint,
    load_angle_deg: f64,
    power_factor_angle_deg: f64,
    phasors: Vec<PhasorRow>,
}

pub fn handle(command: &Commands, format: OutputFormat) -> Result<()> {
    let Commands::Phasor {
        p,
        q,
        vs,
        xd,
        xd_t,
        xq,
        xt,
        xl,
    } = command
    else {
        bail!("phasor handler called with {command:?}");
    };

    let operating_point = SmibOperatingPoint {
        p: *p,
        q: *q,
        vs: *vs,
        xd: *xd,
        xd_t: *xd_t,
        xq: *xq,
        xt: *xt,
        xl: *xl,
    };
    let diagram = operating_point.phasors()?;
    let load_angle_deg = diagram.load_angle().to_degrees().0;
    let power_factor_angle_deg = diagram.power_factor_angle().to_degrees().0;
    info!(load_angle_deg, power_factor_angle_deg, "phasor diagram");

    let output = PhasorOutput {
        operating_point,
        load_angle_deg,
        power_factor_angle_deg,
        phasors: diagram
            .iter()
            .map(|(phasor, z)| PhasorRow {
                phasor,
                re: z.re,
                im: z.im,
                magnitude: z.norm(),
                angle_deg: z.arg().to_degrees(),
            })
            .collect(),
    };

    emit(format, &output, |w| {
        let mut rows: Vec<_> = output
            .phasors
            .iter()
            .map(|row| {
                vec![
                    row.phasor.label().to_string(),
                    fmt_num(row.re),
                    fmt_num(row.im),
                    fmt_num(row.magnitude),
                    fmt_num(row.angle_deg),
                ]
            })
            .collect();
        rows.push(vec![
            "delta".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            fmt_num(output.load_angle_deg),
        ]);
        rows.push(vec![
            "phi".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            fmt_num(output.power_factor_angle_deg),
        ]);
        write_table(&["PHASOR", "RE", "IM", "MAG", "ANGLE [deg]"], &rows, w)
    })
}
