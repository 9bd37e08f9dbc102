//! Log-odds transforms for probability maps.
use ndarray::{Array, ArrayBase, Data, Dimension};

/// Probabilities are clamped to `[EPSILON, 1 - EPSILON]` before taking
/// the log-odds.
pub const EPSILON: f32 = 1e-6;

/// `ln(p / (1 - p))` of each probability.
pub fn to_logodds<S, D>(data: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    data.mapv(|p| {
        let p = p.max(EPSILON).min(1. - EPSILON);
        (p / (1. - p)).ln()
    })
}

/// The logistic function, inverse of [`to_logodds`].
pub fn from_logodds<S, D>(data: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    data.mapv(|x| 1. / (1. + (-x).exp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn logodds_inverts() {
        let p = array![[0.1f32, 0.5], [0.75, 0.9]];
        let back = from_logodds(&to_logodds(&p));
        assert_abs_diff_eq!(back, p, epsilon = 1e-5);
        assert_abs_diff_eq!(to_logodds(&array![0.5f32])[0], 0.);
    }

    #[test]
    fn extremes_are_finite() {
        let x = to_logodds(&array![0f32, 1.]);
        assert!(x.iter().all(|v| v.is_finite()));
        assert!(x[0] < 0. && x[1] > 0.);
    }
}
