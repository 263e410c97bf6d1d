//! Steady-state phasor diagram of a salient-pole machine on an infinite bus.
//!
//! The machine feeds P + jQ into an infinite bus Vs (angle reference)
//! through a step-up transformer X_t and a line X_l. The fictitious EMF
//! E_Q = Vs + j·x_q·I locates the q axis and thereby the load angle δ; the
//! stator current is then split along the d and q axes.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tops_core::{PhasorDiagram, TopsError, TopsResult};

/// Operating point and reactances, all in p.u. on the machine base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmibOperatingPoint {
    /// Active power delivered to the bus
    pub p: f64,
    /// Reactive power delivered to the bus
    pub q: f64,
    /// Infinite-bus voltage magnitude (angle 0)
    pub vs: f64,
    /// Synchronous d-axis reactance X_d
    pub xd: f64,
    /// Transient d-axis reactance X_d'
    pub xd_t: f64,
    /// Synchronous q-axis reactance X_q
    pub xq: f64,
    /// Transformer reactance
    pub xt: f64,
    /// Line reactance
    pub xl: f64,
}

impl Default for SmibOperatingPoint {
    fn default() -> Self {
        Self {
            p: 0.8,
            q: 0.2,
            vs: 1.0,
            xd: 1.8,
            xd_t: 0.3,
            xq: 1.7,
            xt: 0.15,
            xl: 0.3,
        }
    }
}

impl SmibOperatingPoint {
    fn validate(&self) -> TopsResult<()> {
        let fields = [
            ("P", self.p),
            ("Q", self.q),
            ("Vs", self.vs),
            ("Xd", self.xd),
            ("Xd'", self.xd_t),
            ("Xq", self.xq),
            ("Xt", self.xt),
            ("Xl", self.xl),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TopsError::domain(format!("{name} must be finite, got {value}")));
        }
        if self.vs == 0.0 {
            return Err(TopsError::domain(
                "infinite-bus voltage Vs must be non-zero",
            ));
        }
        Ok(())
    }

    /// Solve the phasor diagram.
    pub fn phasors(&self) -> TopsResult<PhasorDiagram> {
        self.validate()?;
        let j = Complex64::i();
        let vs = Complex64::new(self.vs, 0.0);

        let i = Complex64::new(self.p, -self.q) / vs;
        let vt = vs + j * self.xl * i;
        let vg = vs + j * (self.xt + self.xl) * i;

        let xq_total = self.xq + self.xt + self.xl;
        let xd_t_total = self.xd_t + self.xt + self.xl;

        let e_q_axis = vs + j * xq_total * i;
        let delta = e_q_axis.arg();
        let phi = i.arg().abs();
        let beta = delta + phi;

        let id = Complex64::from_polar(i.norm() * beta.sin(), delta - FRAC_PI_2);
        let iq = Complex64::from_polar(i.norm() * beta.cos(), delta);

        let eq = vg + j * self.xd * id + j * self.xq * iq;
        let eq_transient = vs + j * xd_t_total * id + j * xq_total * iq;

        Ok(PhasorDiagram {
            vs,
            vt,
            vg,
            eq,
            eq_transient,
            i,
            id,
            iq,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tops_core::PhasorKind;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_lagging_current_splits_into_d_and_q() {
        let diagram = SmibOperatingPoint::default().phasors().unwrap();
        assert!((diagram.id + diagram.iq - diagram.i).norm() < TOL);
        // Id is perpendicular to Iq
        let dot = diagram.id.re * diagram.iq.re + diagram.id.im * diagram.iq.im;
        assert!(dot.abs() < TOL);
    }

    #[test]
    fn test_internal_emf_lies_on_q_axis() {
        let op = SmibOperatingPoint::default();
        let diagram = op.phasors().unwrap();
        let delta = diagram.load_angle().value();
        let q_axis = (diagram.vs + Complex64::i() * (op.xq + op.xt + op.xl) * diagram.i).arg();
        assert!((delta - q_axis).abs() < 1e-9);
        assert!((diagram.eq_transient.arg() - delta).abs() < 1e-9);
        assert!(diagram.eq_transient.norm() < diagram.eq.norm());
    }

    #[test]
    fn test_current_delivers_requested_power() {
        let op = SmibOperatingPoint {
            p: 0.9,
            q: 0.1,
            vs: 1.05,
            ..Default::default()
        };
        let diagram = op.phasors().unwrap();
        let s = diagram.vs * diagram.i.conj();
        assert!((s.re - 0.9).abs() < TOL);
        assert!((s.im - 0.1).abs() < TOL);
        assert!(diagram.power_factor_angle().value() > 0.0);
    }

    #[test]
    fn test_voltage_drop_grows_along_the_feeder() {
        let diagram = SmibOperatingPoint::default().phasors().unwrap();
        let angles: Vec<f64> = [PhasorKind::Vs, PhasorKind::Vt, PhasorKind::Vg]
            .iter()
            .map(|k| diagram.get(*k).arg())
            .collect();
        assert!(angles[0] < angles[1] && angles[1] < angles[2]);
    }

    #[test]
    fn test_zero_bus_voltage_is_domain_error() {
        let op = SmibOperatingPoint {
            vs: 0.0,
            ..Default::default()
        };
        assert!(matches!(op.phasors(), Err(TopsError::Domain(_))));
    }
}
