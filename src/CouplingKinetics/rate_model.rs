//! Rate expressions of the two irreversible reactions.
//!
//! ```text
//! d[product]/dt    = kc * (PH0 - x - z) * (MCl0 - z - h)
//! d[hydrolyzed]/dt = ks * (MCl0 - z - h)
//! ```
//! Only the unprotonated substrate `PH0 - x - z` couples, so the state must be settled
//! by the equilibrium solver before the rates are evaluated.
use super::coupling_task::CouplingConfig;
use super::equilibrium::State;
use nalgebra::Vector2;

/// monomer still available for coupling and hydrolysis
fn free_monomer(config: &CouplingConfig, state: &State) -> f64 {
    config.initial.monomer - state.product - state.hydrolyzed
}

pub fn d_product_dt(config: &CouplingConfig, state: &State) -> f64 {
    let free_substrate = config.initial.substrate - state.protonated_substrate - state.product;
    config.constants.k_coupling * free_substrate * free_monomer(config, state)
}

pub fn d_hydrolyzed_dt(config: &CouplingConfig, state: &State) -> f64 {
    config.constants.k_hydrolysis * free_monomer(config, state)
}

/// right-hand side for the integrated pair (product, hydrolyzed)
pub fn derivatives(config: &CouplingConfig, state: &State) -> Vector2<f64> {
    Vector2::new(d_product_dt(config, state), d_hydrolyzed_dt(config, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_rates() {
        let mut config = CouplingConfig::default();
        config.constants.k_hydrolysis = 0.5;
        let rates = derivatives(&config, &State::default());
        assert_relative_eq!(rates[0], 38.93 * 0.04363 * 0.06108, epsilon = 1e-15);
        assert_relative_eq!(rates[1], 0.5 * 0.06108, epsilon = 1e-15);
    }

    #[test]
    fn test_protonated_substrate_does_not_couple() {
        let config = CouplingConfig::default();
        let state = State {
            protonated_substrate: 0.04363,
            ..State::default()
        };
        assert_eq!(d_product_dt(&config, &state), 0.0);
    }
}
