use anyhow::{bail, Result};
use serde::Serialize;
use tops_algo::equal_area::{EqualAreaAssessment, EqualAreaCriterion};
use tops_cli::cli::Commands;
use tops_cli::common::{emit, fmt_num, fmt_opt, write_table, OutputFormat};
use tops_cli::config::TopsConfig;
use tracing::{info, warn};

#[derive(Serialize)]
struct EacOutput {
    p_m: f64,
    p_max: f64,
    p_e_sc: f64,
    #[serde(flatten)]
    assessment: EqualAreaAssessment,
    critical_clearing_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<Vec<(f64, f64)>>,
}

pub fn handle(command: &Commands, config: &TopsConfig, format: OutputFormat) -> Result<()> {
    let Commands::Eac {
        p_m,
        e,
        vs,
        x_dt,
        delta_clear,
        p_e_sc,
        curve,
    } = command
    else {
        bail!("eac handler called with {command:?}");
    };

    let criterion = EqualAreaCriterion::new(*p_m, *e, *vs, *x_dt)?
        .with_root_finder(config.root_finder)
        .with_quadrature(config.quadrature);

    let assessment = criterion.assess(*delta_clear, *p_e_sc)?;
    let critical = criterion.critical_clearing_angle(*p_e_sc)?;
    if assessment.verdict.is_stable() {
        info!(verdict = %assessment.verdict, "equal-area assessment");
    } else {
        warn!(verdict = %assessment.verdict, "equal-area assessment");
    }

    let output = EacOutput {
        p_m: criterion.mechanical_power(),
        p_max: criterion.curve().p_max(),
        p_e_sc: *p_e_sc,
        assessment,
        critical_clearing_angle: critical,
        curve: curve.map(|n| criterion.curve().sample(n)),
    };

    emit(format, &output, |w| {
        let areas = output.assessment.areas;
        let rows = vec![
            vec!["P_max".to_string(), fmt_num(output.p_max)],
            vec!["delta_0".to_string(), fmt_num(output.assessment.delta_0)],
            vec!["delta_clear".to_string(), fmt_num(output.assessment.delta_clear)],
            vec!["delta_end".to_string(), fmt_opt(output.assessment.delta_end)],
            vec!["delta_critical".to_string(), fmt_opt(output.critical_clearing_angle)],
            vec!["A1".to_string(), fmt_opt(areas.map(|a| a.a1))],
            vec!["A2".to_string(), fmt_opt(areas.map(|a| a.a2))],
            vec!["margin".to_string(), fmt_opt(areas.map(|a| a.margin()))],
            vec!["verdict".to_string(), output.assessment.verdict.to_string()],
        ];
        write_table(&["QUANTITY", "VALUE"], &rows, &mut *w)?;

        if let Some(samples) = &output.curve {
            writeln!(w)?;
            let rows: Vec<_> = samples
                .iter()
                .map(|(delta, p)| vec![fmt_num(*delta), fmt_num(*p)])
                .collect();
            write_table(&["DELTA [rad]", "P_E [pu]"], &rows, w)?;
        }
        Ok(())
    })
}
