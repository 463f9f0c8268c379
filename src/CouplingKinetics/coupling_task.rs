//! # Coupling Task Module
//!
//! Configuration layer of the coupling kinetics solver. It holds everything a run needs:
//! initial concentrations, rate and equilibrium constants, the time grid and the integrator
//! to use. All records are immutable once a run starts and are passed by reference into
//! every solver call.
//!
//! ## Main Structures
//! - **`InitialConcentrations`**: starting substrate, monomer and base (M)
//! - **`RateConstants`**: coupling and hydrolysis rate constants, protonation equilibrium constants
//! - **`CouplingConfig`**: the two records above, the physical model of the run
//! - **`TimeGrid`**: total simulated time and number of steps
//! - **`CouplingTask`**: full run request, loadable from JSON
//! - **`CouplingError`**, **`DomainError`**, **`Quantity`**: error taxonomy
//!
//! ## Task File Format
//! ```json
//! {
//!   "config": {
//!     "initial": { "substrate": 0.04363, "monomer": 0.06108, "base": 0.07329 },
//!     "constants": { "k_coupling": 38.93, "k_hydrolysis": 0.0, "K1": 4.365e-9, "K2": 1.7782e-11 }
//!   },
//!   "grid": { "t_final": 20.0, "n_steps": 1000 },
//!   "method": "ABM4",
//!   "with_reference": true
//! }
//! ```
//! `method`, `with_reference` and `negativity_tolerance` are optional.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// minimal number of grid steps: the Adams-Bashforth-Moulton method needs 4 settled points
pub const MIN_STEPS: usize = 4;
/// default lower bound for concentrations that are still treated as non-negative (M)
pub const DEFAULT_NEGATIVITY_TOLERANCE: f64 = 1e-12;

/// Concentration (or derived quantity) that left its physical domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// argument of the square root in the protonation balance
    EquilibriumRadicand,
    ProtonatedSubstrate,
    ProtonatedBase,
    Product,
    Hydrolyzed,
    /// initial substrate - protonated substrate - product
    RemainingSubstrate,
    /// initial monomer - product - hydrolyzed
    RemainingMonomer,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::EquilibriumRadicand => "equilibrium radicand",
            Quantity::ProtonatedSubstrate => "protonated substrate",
            Quantity::ProtonatedBase => "protonated base",
            Quantity::Product => "product",
            Quantity::Hydrolyzed => "hydrolyzed monomer",
            Quantity::RemainingSubstrate => "remaining substrate",
            Quantity::RemainingMonomer => "remaining monomer",
        };
        write!(f, "{}", name)
    }
}

/// Out-of-domain value found while settling a single state; carries no step index
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{quantity} out of domain: {value}")]
pub struct DomainError {
    pub quantity: Quantity,
    pub value: f64,
}

impl DomainError {
    pub fn new(quantity: Quantity, value: f64) -> Self {
        Self { quantity, value }
    }
    /// attach the index of the step being advanced
    pub fn at_step(self, step: usize) -> CouplingError {
        CouplingError::NumericalDomain {
            step,
            quantity: self.quantity,
            value: self.value,
        }
    }
}

#[derive(Debug, Error)]
pub enum CouplingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Equilibrium constants are equal (K1/K2 = {0}): protonation balance is undefined")]
    DegenerateEquilibrium(f64),
    #[error("Numerical domain error at step {step}: {quantity} = {value}")]
    NumericalDomain {
        step: usize,
        quantity: Quantity,
        value: f64,
    },
    #[error("Failed to read task file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse task file: {0}")]
    Parse(#[from] serde_json::Error),
}

fn check_positive(name: &str, value: f64) -> Result<(), CouplingError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CouplingError::InvalidConfig(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), CouplingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CouplingError::InvalidConfig(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Initial concentrations, M
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConcentrations {
    /// starting material (substrate)
    pub substrate: f64,
    /// monomer consumed by both the coupling and the hydrolysis
    pub monomer: f64,
    pub base: f64,
}

impl Default for InitialConcentrations {
    fn default() -> Self {
        Self {
            substrate: 0.04363,
            monomer: 0.06108,
            base: 0.07329,
        }
    }
}

/// Kinetic and equilibrium constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct RateConstants {
    /// coupling reaction rate constant, 1/(M*s)
    pub k_coupling: f64,
    /// monomer hydrolysis rate constant, 1/s
    pub k_hydrolysis: f64,
    /// substrate protonation equilibrium constant
    pub K1: f64,
    /// base protonation equilibrium constant
    pub K2: f64,
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            k_coupling: 38.93,
            k_hydrolysis: 0.0,
            K1: 4.365e-9,
            K2: 1.7782e-11,
        }
    }
}

impl RateConstants {
    /// K = K1/K2, the ratio entering the protonation balance
    pub fn equilibrium_ratio(&self) -> f64 {
        self.K1 / self.K2
    }
}

/// Physical model of a run. Read-only for the whole integration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CouplingConfig {
    pub initial: InitialConcentrations,
    pub constants: RateConstants,
}

impl CouplingConfig {
    pub fn new(initial: InitialConcentrations, constants: RateConstants) -> Self {
        Self { initial, constants }
    }

    pub fn validate(&self) -> Result<(), CouplingError> {
        check_positive("initial substrate concentration", self.initial.substrate)?;
        check_positive("initial monomer concentration", self.initial.monomer)?;
        check_positive("initial base concentration", self.initial.base)?;
        check_non_negative("coupling rate constant", self.constants.k_coupling)?;
        check_non_negative("hydrolysis rate constant", self.constants.k_hydrolysis)?;
        check_positive("substrate protonation constant K1", self.constants.K1)?;
        check_positive("base protonation constant K2", self.constants.K2)?;
        let ratio = self.constants.equilibrium_ratio();
        if !ratio.is_finite() {
            return Err(CouplingError::InvalidConfig(format!(
                "K1/K2 is not finite: {}",
                ratio
            )));
        }
        if (ratio - 1.0).abs() <= f64::EPSILON {
            return Err(CouplingError::DegenerateEquilibrium(ratio));
        }
        Ok(())
    }
}

/// Uniform time grid with `n_steps + 1` points on [0, t_final]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub t_final: f64,
    pub n_steps: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            t_final: 20.0,
            n_steps: 1000,
        }
    }
}

impl TimeGrid {
    pub fn new(t_final: f64, n_steps: usize) -> Self {
        Self { t_final, n_steps }
    }

    pub fn dt(&self) -> f64 {
        self.t_final / self.n_steps as f64
    }

    pub fn time(&self, i: usize) -> f64 {
        i as f64 * self.dt()
    }

    /// nearest grid index to `t`, clamped to the grid
    pub fn index_of(&self, t: f64) -> usize {
        if t <= 0.0 {
            return 0;
        }
        let i = (t / self.dt()).round() as usize;
        i.min(self.n_steps)
    }

    pub fn validate(&self) -> Result<(), CouplingError> {
        check_positive("total simulated time", self.t_final)?;
        if self.n_steps < MIN_STEPS {
            return Err(CouplingError::InvalidConfig(format!(
                "number of steps must be at least {}, got {}",
                MIN_STEPS, self.n_steps
            )));
        }
        Ok(())
    }
}

/// Integration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Method {
    /// classical Runge-Kutta on every step
    RK4,
    /// Runge-Kutta start-up, then Adams-Bashforth-Moulton predictor-corrector
    #[default]
    ABM4,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::RK4 => write!(f, "RK4"),
            Method::ABM4 => write!(f, "ABM4"),
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_NEGATIVITY_TOLERANCE
}

/// Complete run request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingTask {
    pub config: CouplingConfig,
    pub grid: TimeGrid,
    #[serde(default)]
    pub method: Method,
    /// also integrate the same grid with RK4 only, for cross-checking
    #[serde(default)]
    pub with_reference: bool,
    #[serde(default = "default_tolerance")]
    pub negativity_tolerance: f64,
}

impl Default for CouplingTask {
    fn default() -> Self {
        Self {
            config: CouplingConfig::default(),
            grid: TimeGrid::default(),
            method: Method::default(),
            with_reference: false,
            negativity_tolerance: DEFAULT_NEGATIVITY_TOLERANCE,
        }
    }
}

impl CouplingTask {
    pub fn new(config: CouplingConfig, grid: TimeGrid, method: Method) -> Self {
        Self {
            config,
            grid,
            method,
            ..Self::default()
        }
    }

    pub fn check_task(&self) -> Result<(), CouplingError> {
        self.config.validate()?;
        self.grid.validate()?;
        check_non_negative("negativity tolerance", self.negativity_tolerance)?;
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self, CouplingError> {
        let task: CouplingTask = serde_json::from_str(content)?;
        Ok(task)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CouplingError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
