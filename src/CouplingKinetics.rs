//! # Coupling Kinetics with Protonation Equilibrium
//!
//! Time evolution of a coupling (condensation) reaction of a substrate with a monomer, the
//! competing hydrolysis of the monomer and the acid-base protonation equilibrium of the
//! substrate and the base that scavenges the released acid.
//!
//! ## Model
//!
//! | Symbol | Field | Description |
//! |--------|-------|-------------|
//! | `x` | `protonated_substrate` | protonated starting material, from the equilibrium |
//! | `y` | `protonated_base` | protonated base, from the equilibrium |
//! | `z` | `product` | coupling product, integrated |
//! | `h` | `hydrolyzed` | hydrolyzed monomer, integrated |
//!
//! ```text
//! dz/dt = kc * (PH0 - x - z) * (MCl0 - z - h)
//! dh/dt = ks * (MCl0 - z - h)
//! x, y  = protonation balance(z, h; PH0, B0, K1/K2)
//! ```
//! Only `z` and `h` are integrated. After every differential (sub)step the equilibrium
//! solver re-derives `x` and `y`, so rates are always evaluated on a settled state.
//!
//! ## Numerical Solution
//! - RK4 on every step, or
//! - RK4 for steps 1..3 and a single-pass Adams-Bashforth-Moulton predictor-corrector
//!   (predict, settle, correct, settle) for the rest.
//!
//! Both can be run on the same grid to cross-check each other. Runs are single-threaded
//! recurrences; any out-of-domain value stops the run with the step index and quantity.
//!
//! ## Example
//! ```rust,ignore
//! use PMOcoupling::CouplingKinetics::coupling_task::{CouplingTask, Method, TimeGrid};
//! use PMOcoupling::CouplingKinetics::trajectory::simulate;
//!
//! let mut task = CouplingTask::default();
//! task.grid = TimeGrid::new(20.0, 1000);
//! task.method = Method::ABM4;
//! task.with_reference = true;
//! let (abm4, rk4) = simulate(&task)?;
//! ```

/// configuration records, time grid, method selection, error types
pub mod coupling_task;
/// remaining substrate, conversion and table printing of trajectories
pub mod coupling_output;
/// state of the system and the closed-form protonation balance
pub mod equilibrium;
/// RK4 and ABM4 steppers
pub mod integrators;
pub mod rate_model;
/// trajectory buffer and run driver
pub mod trajectory;
mod integrators_tests;
