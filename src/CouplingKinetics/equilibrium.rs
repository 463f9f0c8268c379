//! Protonation equilibrium of substrate and base.
//!
//! The acid released by the coupling and by the hydrolysis (`H = product + hydrolyzed`) is shared
//! between the substrate and the base. With `K = K1/K2`, `R = initial_substrate - product` and
//! `B = initial_base - product - hydrolyzed` the charge and mass balance give the quadratic
//! ```text
//! (K-1)*x^2 + (K*B + H + R)*x - H*R = 0
//! ```
//! whose positive root is the protonated substrate `x`; the protonated base is `H - x`.
//! For `b = K*B + H + R >= 0` the root is taken as `2*H*R / (b + sqrt(b^2 + 4*(K-1)*H*R))`,
//! which stays accurate as `K` approaches 1.
use super::coupling_task::{CouplingConfig, DomainError, Quantity};
use nalgebra::Vector2;

/// Concentrations at one time point, M
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    /// protonated fraction of the starting material, derived from the equilibrium
    pub protonated_substrate: f64,
    /// protonated fraction of the base, derived from the equilibrium
    pub protonated_base: f64,
    /// coupling product, integrated
    pub product: f64,
    /// hydrolyzed monomer, integrated
    pub hydrolyzed: f64,
}

impl State {
    /// (product, hydrolyzed): the integrated variables
    pub fn independent(&self) -> Vector2<f64> {
        Vector2::new(self.product, self.hydrolyzed)
    }
}

/// Closed-form root of the protonation balance.
/// Returns (protonated_substrate, protonated_base). Requires K1 != K2.
pub fn solve_equilibrium(
    config: &CouplingConfig,
    product: f64,
    hydrolyzed: f64,
) -> Result<(f64, f64), DomainError> {
    let K = config.constants.equilibrium_ratio();
    let H = product + hydrolyzed;
    let R = config.initial.substrate - product;
    let B = config.initial.base - product - hydrolyzed;

    let b = K * B + H + R;
    let radicand = b * b + 4.0 * (K - 1.0) * H * R;
    if !radicand.is_finite() || radicand < 0.0 {
        return Err(DomainError::new(Quantity::EquilibriumRadicand, radicand));
    }
    let root = radicand.sqrt();
    let x = if b >= 0.0 {
        2.0 * H * R / (b + root)
    } else {
        (root - b) / (2.0 * (K - 1.0))
    };
    if !x.is_finite() {
        return Err(DomainError::new(Quantity::ProtonatedSubstrate, x));
    }
    Ok((x, H - x))
}

/// Builds a state from the integrated variables with the dependent fields recomputed
pub fn settle(
    config: &CouplingConfig,
    independent: Vector2<f64>,
) -> Result<State, DomainError> {
    let (product, hydrolyzed) = (independent[0], independent[1]);
    if !product.is_finite() {
        return Err(DomainError::new(Quantity::Product, product));
    }
    if !hydrolyzed.is_finite() {
        return Err(DomainError::new(Quantity::Hydrolyzed, hydrolyzed));
    }
    let (protonated_substrate, protonated_base) = solve_equilibrium(config, product, hydrolyzed)?;
    Ok(State {
        protonated_substrate,
        protonated_base,
        product,
        hydrolyzed,
    })
}

/// Recomputes the dependent fields of an existing state, leaving product and hydrolyzed unchanged
pub fn resettle(config: &CouplingConfig, state: &State) -> Result<State, DomainError> {
    settle(config, state.independent())
}

/// Physical check of a state that is about to be stored: no concentration below `-tolerance`
pub fn check_state(
    config: &CouplingConfig,
    state: &State,
    tolerance: f64,
) -> Result<(), DomainError> {
    let remaining_substrate =
        config.initial.substrate - state.protonated_substrate - state.product;
    let remaining_monomer = config.initial.monomer - state.product - state.hydrolyzed;
    let checks = [
        (Quantity::Product, state.product),
        (Quantity::Hydrolyzed, state.hydrolyzed),
        (Quantity::ProtonatedSubstrate, state.protonated_substrate),
        (Quantity::ProtonatedBase, state.protonated_base),
        (Quantity::RemainingSubstrate, remaining_substrate),
        (Quantity::RemainingMonomer, remaining_monomer),
    ];
    for (quantity, value) in checks {
        if !value.is_finite() || value < -tolerance {
            return Err(DomainError::new(quantity, value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CouplingKinetics::coupling_task::RateConstants;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_state_has_zero_protonation() {
        let config = CouplingConfig::default();
        let (x, y) = solve_equilibrium(&config, 0.0, 0.0).unwrap();
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_root_satisfies_quadratic() {
        let config = CouplingConfig::default();
        let (z, h) = (0.02, 0.005);
        let (x, y) = solve_equilibrium(&config, z, h).unwrap();
        let K = config.constants.equilibrium_ratio();
        let H = z + h;
        let R = config.initial.substrate - z;
        let B = config.initial.base - z - h;
        let residual = (K - 1.0) * x * x + (K * B + H + R) * x - H * R;
        assert_relative_eq!(residual, 0.0, epsilon = 1e-15);
        assert_relative_eq!(x + y, H, epsilon = 1e-15);
        assert!(x > 0.0 && y > 0.0);
    }

    #[test]
    fn test_ratio_below_one() {
        // K < 1: the positive root is still selected
        let mut config = CouplingConfig::default();
        config.constants = RateConstants {
            K1: 1e-11,
            K2: 4e-9,
            ..RateConstants::default()
        };
        let (x, y) = solve_equilibrium(&config, 0.01, 0.0).unwrap();
        assert!(x >= 0.0 && x <= 0.01);
        assert_relative_eq!(x + y, 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_ratio_next_to_one() {
        // K - 1 ~ 1e-15: the root must not lose its digits to cancellation
        let mut config = CouplingConfig::default();
        config.constants.K1 = 1e-9 * (1.0 + 4.0 * f64::EPSILON);
        config.constants.K2 = 1e-9;
        assert!(config.validate().is_ok());
        let z = 0.02;
        let (x, y) = solve_equilibrium(&config, z, 0.0).unwrap();
        let K = config.constants.equilibrium_ratio();
        let R = config.initial.substrate - z;
        let B = config.initial.base - z;
        let residual = (K - 1.0) * x * x + (K * B + z + R) * x - z * R;
        assert_relative_eq!(residual, 0.0, epsilon = 1e-15);
        assert_relative_eq!(x, 4.876186545604621e-3, max_relative = 1e-12);
        assert_relative_eq!(x + y, z, epsilon = 1e-15);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let config = CouplingConfig::default();
        let state = settle(&config, Vector2::new(0.03, 0.001)).unwrap();
        let again = resettle(&config, &state).unwrap();
        assert_eq!(state, again);
    }

    #[test]
    fn test_settle_rejects_nan() {
        let config = CouplingConfig::default();
        let err = settle(&config, Vector2::new(f64::NAN, 0.0)).unwrap_err();
        assert_eq!(err.quantity, Quantity::Product);
    }

    #[test]
    fn test_check_state_flags_overshoot() {
        let config = CouplingConfig::default();
        let state = State {
            protonated_substrate: 0.01,
            protonated_base: 0.0,
            product: 0.04,
            hydrolyzed: 0.0,
        };
        let err = check_state(&config, &state, 1e-12).unwrap_err();
        assert_eq!(err.quantity, Quantity::RemainingSubstrate);
    }
}
