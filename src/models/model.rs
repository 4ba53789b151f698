//! Titre models for the 29% and 54% acid grades.
//!
//! Both grades use the same second-degree interaction surface in density `d`
//! and TS `s`:
//!
//! ```text
//! titre(d, s) = c0 + c1·d + c2·s + c3·d² + c4·d·s + c5·s²
//! ```
//!
//! with an independently fitted coefficient table per grade. The tables are
//! opaque constants: they were fitted offline against lab data and are not
//! re-estimated here.

use crate::domain::{Grade, MeasurementInput, PredictionResult};

/// Coefficients of a quadratic surface in (density, TS).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticModel {
    pub intercept: f64,
    pub density: f64,
    pub ts: f64,
    pub density_sq: f64,
    pub cross: f64,
    pub ts_sq: f64,
}

impl QuadraticModel {
    /// Evaluate the surface.
    ///
    /// Terms are summed left to right in the order listed in the module docs and
    /// the cross term is `(c4·d)·s`; keep it that way so values stay
    /// bit-identical to the reference tool.
    pub fn eval(&self, density: f64, ts: f64) -> f64 {
        self.intercept
            + self.density * density
            + self.ts * ts
            + self.density_sq * (density * density)
            + self.cross * density * ts
            + self.ts_sq * (ts * ts)
    }

    /// Coefficients in term order `[c0, c1, c2, c3, c4, c5]`.
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.intercept,
            self.density,
            self.ts,
            self.density_sq,
            self.cross,
            self.ts_sq,
        ]
    }
}

/// Term labels matching [`QuadraticModel::coefficients`].
pub const TERM_LABELS: [&str; 6] = ["", "density", "TS", "density²", "density·TS", "TS²"];

pub const TITRE_29: QuadraticModel = QuadraticModel {
    intercept: -386.871156,
    density: 0.555471,
    ts: 3.959929,
    density_sq: -0.000182,
    cross: -0.004088,
    ts_sq: 0.201024,
};

pub const TITRE_54: QuadraticModel = QuadraticModel {
    intercept: 88.015120,
    density: -0.102618,
    ts: 9.746723,
    density_sq: 0.000049,
    cross: -0.006485,
    ts_sq: 0.017463,
};

/// Coefficient table for a grade.
pub fn model_for(grade: Grade) -> &'static QuadraticModel {
    match grade {
        Grade::G29 => &TITRE_29,
        Grade::G54 => &TITRE_54,
    }
}

/// Estimated titre (%) for the 29% grade.
pub fn predict_titre_29(density: f64, ts: f64) -> f64 {
    TITRE_29.eval(density, ts)
}

/// Estimated titre (%) for the 54% grade.
pub fn predict_titre_54(density: f64, ts: f64) -> f64 {
    TITRE_54.eval(density, ts)
}

/// Evaluate the model for `grade`.
///
/// No clamping, domain check or logging: out-of-range and non-finite inputs
/// are evaluated as-is.
pub fn predict(grade: Grade, input: &MeasurementInput) -> PredictionResult {
    let value = match grade {
        Grade::G29 => predict_titre_29(input.density, input.ts),
        Grade::G54 => predict_titre_54(input.density, input.ts),
    };
    PredictionResult {
        grade,
        label: grade.label(),
        density: input.density,
        ts: input.ts,
        value,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn reference_values_at_form_defaults() {
        assert_eq!(predict_titre_54(1290.0, 0.9), 38.435910729999996);
        assert_eq!(predict_titre_29(1290.0, 0.9), 25.800831540000118);
    }

    #[test]
    fn reference_values_inside_range() {
        assert_eq!(predict_titre_54(1500.0, 25.5), 56.18362224999997);
        assert_eq!(predict_titre_29(1500.0, 25.5), 112.16338950000019);
        assert_eq!(predict_titre_54(1700.0, 100.0), 102.02681999999993);
        assert_eq!(predict_titre_29(1700.0, 100.0), 1742.722444);
    }

    #[test]
    fn intercepts_at_origin() {
        assert_eq!(predict_titre_54(0.0, 0.0), 88.015120);
        assert_eq!(predict_titre_29(0.0, 0.0), -386.871156);
    }

    #[test]
    fn matches_written_out_formula() {
        let (d, s) = (1432.5_f64, 12.34_f64);
        let y54 = 88.015120 - 0.102618 * d + 9.746723 * s + 0.000049 * d.powi(2)
            - 0.006485 * d * s
            + 0.017463 * s.powi(2);
        let y29 = -386.871156 + 0.555471 * d + 3.959929 * s - 0.000182 * d.powi(2)
            - 0.004088 * d * s
            + 0.201024 * s.powi(2);
        assert_eq!(predict_titre_54(d, s), y54);
        assert_eq!(predict_titre_29(d, s), y29);
    }

    #[test]
    fn density_finite_difference_54() {
        for &d in &[0.0, 1220.0, 1290.0, 1500.0, 1700.0] {
            let diff = predict_titre_54(d + 1.0, 0.0) - predict_titre_54(d, 0.0);
            let expected = -0.102618 + 0.000049 * (2.0 * d + 1.0);
            assert!(
                (diff - expected).abs() < 1e-8,
                "d={d}: diff={diff} expected={expected}"
            );
        }
    }

    #[test]
    fn nan_propagates() {
        assert!(predict_titre_29(f64::NAN, 0.0).is_nan());
        assert!(predict_titre_54(0.0, f64::NAN).is_nan());
        assert!(!predict_titre_29(f64::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn finite_inputs_give_finite_deterministic_outputs() {
        let mut rng = StdRng::seed_from_u64(0x7_17e);
        for _ in 0..10_000 {
            let d = rng.gen_range(-1.0e5..1.0e5);
            let s = rng.gen_range(-1.0e3..1.0e3);
            for grade in Grade::ALL {
                let input = MeasurementInput::new(d, s);
                let a = predict(grade, &input).value;
                let b = predict(grade, &input).value;
                assert!(a.is_finite(), "{grade} at ({d}, {s}) gave {a}");
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn predict_dispatches_on_grade() {
        let input = MeasurementInput::default();
        let r29 = predict(Grade::G29, &input);
        let r54 = predict(Grade::G54, &input);
        assert_eq!(r29.value, predict_titre_29(1290.0, 0.9));
        assert_eq!(r54.value, predict_titre_54(1290.0, 0.9));
        assert_eq!(r29.label, "Titre 29%");
        assert_eq!(r54.density, 1290.0);
        assert_eq!(model_for(Grade::G54).coefficients()[0], 88.015120);
    }
}
