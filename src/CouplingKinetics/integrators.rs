//! # Fixed-Step Integrators
//!
//! Two explicit 4th-order methods for the pair (product, hydrolyzed). Every intermediate
//! state is passed through the equilibrium solver before its rates are evaluated, so the
//! protonated fractions are never integrated.
//!
//! - **`RungeKutta4`**: self-starting, needs only the previous settled state
//! - **`AdamsBashforthMoulton4`**: 4-step Adams-Bashforth predictor and Adams-Moulton corrector,
//!   applied once per step (PECE). Needs 4 settled history points.
//!
//! Both implement [`Integrator`]; [`IntegratorEnum`] dispatches between them statically.
//! An integrator receives the settled history `states[..i]` and returns the settled `states[i]`;
//! it never writes into the trajectory itself.
use super::coupling_task::{CouplingConfig, CouplingError, DomainError, Method};
use super::equilibrium::{State, settle};
use super::rate_model::derivatives;
use enum_dispatch::enum_dispatch;

/// Adams-Bashforth 4-step coefficients for f(i-1), f(i-2), f(i-3), f(i-4), over 24
const AB4: [f64; 4] = [55.0, -59.0, 37.0, -9.0];
/// Adams-Moulton coefficients for f(i), f(i-1), f(i-2), f(i-3), over 24
const AM4: [f64; 4] = [9.0, 19.0, -5.0, 1.0];

#[enum_dispatch]
pub trait Integrator {
    fn name(&self) -> &'static str;
    /// number of settled points needed before the method can advance
    fn history_len(&self) -> usize;
    /// advance `history[..i]` to the settled state `i`, where `i = history.len()`
    fn step(
        &self,
        config: &CouplingConfig,
        history: &[State],
        dt: f64,
    ) -> Result<State, CouplingError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKutta4;

#[derive(Debug, Clone, Copy, Default)]
pub struct AdamsBashforthMoulton4;

#[derive(Debug, Clone, Copy)]
#[enum_dispatch(Integrator)]
pub enum IntegratorEnum {
    RK4(RungeKutta4),
    ABM4(AdamsBashforthMoulton4),
}

pub fn create_integrator(method: Method) -> IntegratorEnum {
    match method {
        Method::RK4 => IntegratorEnum::RK4(RungeKutta4),
        Method::ABM4 => IntegratorEnum::ABM4(AdamsBashforthMoulton4),
    }
}

fn short_history(name: &str, needed: usize, got: usize) -> CouplingError {
    CouplingError::InvalidConfig(format!(
        "{} needs {} settled points, got {}",
        name, needed, got
    ))
}

impl Integrator for RungeKutta4 {
    fn name(&self) -> &'static str {
        "RK4"
    }

    fn history_len(&self) -> usize {
        1
    }

    fn step(
        &self,
        config: &CouplingConfig,
        history: &[State],
        dt: f64,
    ) -> Result<State, CouplingError> {
        let i = history.len();
        let previous = history
            .last()
            .ok_or_else(|| short_history(self.name(), self.history_len(), i))?;
        let at_step = move |e: DomainError| e.at_step(i);
        let y0 = previous.independent();

        let k1 = derivatives(config, previous);
        let trial = settle(config, y0 + k1 * (0.5 * dt)).map_err(at_step)?;
        let k2 = derivatives(config, &trial);
        let trial = settle(config, y0 + k2 * (0.5 * dt)).map_err(at_step)?;
        let k3 = derivatives(config, &trial);
        let trial = settle(config, y0 + k3 * dt).map_err(at_step)?;
        let k4 = derivatives(config, &trial);

        let y = y0 + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
        settle(config, y).map_err(at_step)
    }
}

impl Integrator for AdamsBashforthMoulton4 {
    fn name(&self) -> &'static str {
        "ABM4"
    }

    fn history_len(&self) -> usize {
        4
    }

    fn step(
        &self,
        config: &CouplingConfig,
        history: &[State],
        dt: f64,
    ) -> Result<State, CouplingError> {
        let i = history.len();
        if i < self.history_len() {
            return Err(short_history(self.name(), self.history_len(), i));
        }
        let at_step = move |e: DomainError| e.at_step(i);
        let y_prev = history[i - 1].independent();
        // f(i-1), f(i-2), f(i-3), f(i-4) from settled history
        let f1 = derivatives(config, &history[i - 1]);
        let f2 = derivatives(config, &history[i - 2]);
        let f3 = derivatives(config, &history[i - 3]);
        let f4 = derivatives(config, &history[i - 4]);

        let predicted =
            y_prev + (f1 * AB4[0] + f2 * AB4[1] + f3 * AB4[2] + f4 * AB4[3]) * (dt / 24.0);
        let predicted = settle(config, predicted).map_err(at_step)?;
        let f0 = derivatives(config, &predicted);

        let corrected =
            y_prev + (f0 * AM4[0] + f1 * AM4[1] + f2 * AM4[2] + f3 * AM4[3]) * (dt / 24.0);
        settle(config, corrected).map_err(at_step)
    }
}
