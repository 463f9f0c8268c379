//! # Trajectory Driver
//!
//! Builds the time grid, seeds the zero state, runs RK4 over the start-up window and the
//! selected integrator over the rest. The trajectory buffer is owned here; integrators only
//! see the settled prefix and return the next state, which is validated and written once
//! into its slot.
//!
//! ## Usage
//! ```rust,ignore
//! use PMOcoupling::CouplingKinetics::coupling_task::{CouplingTask, Method};
//! use PMOcoupling::CouplingKinetics::trajectory::CouplingIVP;
//!
//! let mut ivp = CouplingIVP::new(CouplingTask::default());
//! ivp.set_time_grid(20.0, 1000)?;
//! ivp.set_method(Method::ABM4);
//! ivp.solve()?;
//! let trajectory = ivp.get_solution().unwrap();
//! ```
use super::coupling_task::{CouplingConfig, CouplingError, CouplingTask, Method, TimeGrid};
use super::equilibrium::{State, check_state, settle};
use super::integrators::{Integrator, RungeKutta4, create_integrator};
use log::{debug, error, info};
use nalgebra::Vector2;

/// States on a uniform grid, index = step number
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub grid: TimeGrid,
    pub method: Method,
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn dt(&self) -> f64 {
        self.grid.dt()
    }

    pub fn time(&self, i: usize) -> f64 {
        self.grid.time(i)
    }

    pub fn get(&self, i: usize) -> Option<&State> {
        self.states.get(i)
    }

    /// state at the grid point nearest to `t`
    pub fn at_time(&self, t: f64) -> Option<&State> {
        self.states.get(self.grid.index_of(t))
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    /// (t, state) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(move |(i, s)| (self.grid.time(i), s))
    }
}

/// Integrates the whole grid with the given method. Inputs must already be validated.
pub fn integrate(
    config: &CouplingConfig,
    grid: &TimeGrid,
    method: Method,
    tolerance: f64,
) -> Result<Trajectory, CouplingError> {
    let n = grid.n_steps;
    let dt = grid.dt();
    let stepper = create_integrator(method);
    let bootstrap = RungeKutta4;
    info!(
        "integrating with {}: t_final = {}, N = {}, dt = {}",
        stepper.name(),
        grid.t_final,
        n,
        dt
    );

    let mut states = vec![State::default(); n + 1];
    states[0] = settle(config, Vector2::zeros()).map_err(|e| e.at_step(0))?;

    for i in 1..=n {
        let new_state = if i < stepper.history_len() {
            debug!("start-up step {} with {}", i, bootstrap.name());
            bootstrap.step(config, &states[..i], dt)?
        } else {
            stepper.step(config, &states[..i], dt)?
        };
        check_state(config, &new_state, tolerance).map_err(|e| e.at_step(i))?;
        states[i] = new_state;
    }

    if let Some(last) = states.last() {
        info!(
            "{} finished: product = {}, hydrolyzed = {} at t = {}",
            stepper.name(),
            last.product,
            last.hydrolyzed,
            grid.t_final
        );
    }
    Ok(Trajectory {
        grid: *grid,
        method,
        states,
    })
}

/// Runs a validated task: the selected method, and the RK4-only reference if requested
pub fn simulate(task: &CouplingTask) -> Result<(Trajectory, Option<Trajectory>), CouplingError> {
    task.check_task()?;
    let primary = integrate(
        &task.config,
        &task.grid,
        task.method,
        task.negativity_tolerance,
    );
    let primary = match primary {
        Ok(trajectory) => trajectory,
        Err(e) => {
            error!("{} run failed: {}", task.method, e);
            return Err(e);
        }
    };
    if !task.with_reference {
        return Ok((primary, None));
    }
    match integrate(
        &task.config,
        &task.grid,
        Method::RK4,
        task.negativity_tolerance,
    ) {
        Ok(reference) => Ok((primary, Some(reference))),
        Err(e) => {
            error!("RK4 reference run failed: {}", e);
            Err(e)
        }
    }
}

/// Stateful wrapper: set up a task, solve, read the results back
#[derive(Debug, Clone)]
pub struct CouplingIVP {
    pub task: CouplingTask,
    /// trajectory of the selected method
    pub solution: Option<Trajectory>,
    /// RK4-only trajectory on the same grid
    pub reference: Option<Trajectory>,
}

impl CouplingIVP {
    pub fn new(task: CouplingTask) -> Self {
        Self {
            task,
            solution: None,
            reference: None,
        }
    }

    pub fn set_config(&mut self, config: CouplingConfig) -> Result<(), CouplingError> {
        config.validate()?;
        self.task.config = config;
        Ok(())
    }

    pub fn set_time_grid(&mut self, t_final: f64, n_steps: usize) -> Result<(), CouplingError> {
        let grid = TimeGrid::new(t_final, n_steps);
        grid.validate()?;
        self.task.grid = grid;
        Ok(())
    }

    pub fn set_method(&mut self, method: Method) {
        self.task.method = method;
    }

    pub fn set_reference(&mut self, with_reference: bool) {
        self.task.with_reference = with_reference;
    }

    pub fn check_task(&self) -> Result<(), CouplingError> {
        self.task.check_task()
    }

    pub fn solve(&mut self) -> Result<(), CouplingError> {
        self.solution = None;
        self.reference = None;
        let (primary, reference) = simulate(&self.task)?;
        self.solution = Some(primary);
        self.reference = reference;
        Ok(())
    }

    pub fn get_solution(&self) -> Option<&Trajectory> {
        self.solution.as_ref()
    }

    pub fn get_reference(&self) -> Option<&Trajectory> {
        self.reference.as_ref()
    }
}
