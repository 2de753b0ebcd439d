//! Elementwise sigmoid nonlinearity and its derivative.

/// Logistic sigmoid, clamped so `exp` never overflows for extreme inputs.
pub fn sigmoid(z: f64) -> f64 {
    if z < -40.0 {
        0.0
    } else if z > 40.0 {
        1.0
    } else {
        1.0 / (1.0 + f64::exp(-z))
    }
}

/// Derivative of the sigmoid with respect to the pre-activation `z`.
pub fn sigmoid_prime(z: f64) -> f64 {
    sigmoid(z) * (1.0 - sigmoid(z))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn sigmoid_midpoint_and_symmetry() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(2.0) + sigmoid(-2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_saturates_without_overflow() {
        assert_eq!(sigmoid(-1e6), 0.0);
        assert_eq!(sigmoid(1e6), 1.0);
        assert!(sigmoid(-1e6).is_finite());
    }

    #[test]
    fn prime_matches_finite_difference() {
        let h = 1e-6;
        for &z in &[-3.0, -0.5, 0.0, 0.5, 3.0] {
            let numeric = (sigmoid(z + h) - sigmoid(z - h)) / (2.0 * h);
            assert_relative_eq!(sigmoid_prime(z), numeric, epsilon = 1e-8);
        }
    }

    #[test]
    fn prime_peaks_at_zero() {
        assert_relative_eq!(sigmoid_prime(0.0), 0.25);
        assert!(sigmoid_prime(4.0) < sigmoid_prime(0.0));
    }
}
