#[cfg(test)]
mod tests {
    use crate::CouplingKinetics::coupling_task::{CouplingConfig, CouplingError, Method, Quantity};
    use crate::CouplingKinetics::equilibrium::{State, resettle, settle};
    use crate::CouplingKinetics::integrators::{
        AdamsBashforthMoulton4, Integrator, IntegratorEnum, RungeKutta4, create_integrator,
    };
    use crate::CouplingKinetics::rate_model::derivatives;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn zero_state(config: &CouplingConfig) -> State {
        settle(config, Vector2::zeros()).unwrap()
    }

    fn rk4_history(config: &CouplingConfig, dt: f64, n: usize) -> Vec<State> {
        let mut history = vec![zero_state(config)];
        for _ in 0..n {
            let next = RungeKutta4.step(config, &history, dt).unwrap();
            history.push(next);
        }
        history
    }

    #[test]
    fn test_create_integrator() {
        let rk4 = create_integrator(Method::RK4);
        let abm4 = create_integrator(Method::ABM4);
        assert!(matches!(rk4, IntegratorEnum::RK4(_)));
        assert!(matches!(abm4, IntegratorEnum::ABM4(_)));
        assert_eq!(rk4.history_len(), 1);
        assert_eq!(abm4.history_len(), 4);
        assert_eq!(abm4.name(), "ABM4");
    }

    #[test]
    fn test_rk4_first_step_reference_value() {
        let config = CouplingConfig::default();
        let history = rk4_history(&config, 0.02, 1);
        let first = history[1];
        assert_relative_eq!(first.product, 0.001993500157405031, max_relative = 1e-10);
        assert_relative_eq!(first.protonated_substrate, 4.730517830816597e-06, max_relative = 1e-8);
        assert_relative_eq!(first.protonated_base, 0.0019887696395742144, max_relative = 1e-8);
        assert_eq!(history[1].hydrolyzed, 0.0);
    }

    #[test]
    fn test_rk4_step_settles_equilibrium() {
        let mut config = CouplingConfig::default();
        config.constants.k_hydrolysis = 0.5;
        let history = rk4_history(&config, 0.02, 3);
        for state in &history {
            assert_eq!(*state, resettle(&config, state).unwrap());
        }
    }

    #[test]
    fn test_rk4_matches_exponential_decay() {
        // kc = 0: the free monomer decays as exp(-ks*t)
        let mut config = CouplingConfig::default();
        config.constants.k_coupling = 0.0;
        config.constants.k_hydrolysis = 0.5;
        let dt = 0.1;
        let history = rk4_history(&config, dt, 10);
        let t = 10.0 * dt;
        let expected = config.initial.monomer * (1.0 - (-0.5_f64 * t).exp());
        assert_relative_eq!(history[10].hydrolyzed, expected, max_relative = 1e-7);
        assert_eq!(history[10].product, 0.0);
    }

    #[test]
    fn test_abm4_needs_four_points() {
        let config = CouplingConfig::default();
        let history = rk4_history(&config, 0.02, 2);
        let result = AdamsBashforthMoulton4.step(&config, &history, 0.02);
        assert!(matches!(result, Err(CouplingError::InvalidConfig(_))));
    }

    #[test]
    fn test_rk4_needs_a_point() {
        let config = CouplingConfig::default();
        let result = RungeKutta4.step(&config, &[], 0.02);
        assert!(matches!(result, Err(CouplingError::InvalidConfig(_))));
    }

    #[test]
    fn test_abm4_step_is_predict_settle_correct_settle() {
        let mut config = CouplingConfig::default();
        config.constants.k_hydrolysis = 0.5;
        let dt = 0.02;
        let history = rk4_history(&config, dt, 3);
        let next = AdamsBashforthMoulton4.step(&config, &history, dt).unwrap();

        let f: Vec<Vector2<f64>> = history.iter().map(|s| derivatives(&config, s)).collect();
        let y_prev = history[3].independent();
        let predicted =
            y_prev + (f[3] * 55.0 - f[2] * 59.0 + f[1] * 37.0 - f[0] * 9.0) * (dt / 24.0);
        let predicted = settle(&config, predicted).unwrap();
        let f_pred = derivatives(&config, &predicted);
        let corrected = y_prev + (f_pred * 9.0 + f[3] * 19.0 - f[2] * 5.0 + f[1]) * (dt / 24.0);
        let expected = settle(&config, corrected).unwrap();

        assert_relative_eq!(next.product, expected.product, epsilon = 1e-16);
        assert_relative_eq!(next.hydrolyzed, expected.hydrolyzed, epsilon = 1e-16);
        assert_eq!(next, resettle(&config, &next).unwrap());
    }

    #[test]
    fn test_abm4_step_close_to_rk4_step() {
        let mut config = CouplingConfig::default();
        config.constants.k_hydrolysis = 0.5;
        let dt = 0.01;
        let history = rk4_history(&config, dt, 4);
        let abm = AdamsBashforthMoulton4
            .step(&config, &history[..4], dt)
            .unwrap();
        assert_relative_eq!(abm.product, history[4].product, max_relative = 1e-6);
        assert_relative_eq!(abm.hydrolyzed, history[4].hydrolyzed, max_relative = 1e-6);
    }

    #[test]
    fn test_domain_error_carries_step_index() {
        let config = CouplingConfig::default();
        let zero = zero_state(&config);
        let runaway = State {
            product: 1e200,
            ..State::default()
        };
        // rate overflows to infinity, the first trial state is not finite
        let history = vec![zero, zero, runaway];
        match RungeKutta4.step(&config, &history, 0.02) {
            Err(CouplingError::NumericalDomain { step, quantity, .. }) => {
                assert_eq!(step, 3);
                assert_eq!(quantity, Quantity::Product);
            }
            other => panic!("expected NumericalDomain error, got {:?}", other),
        }
    }
}
