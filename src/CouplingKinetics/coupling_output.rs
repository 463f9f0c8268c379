use super::coupling_task::CouplingConfig;
use super::equilibrium::State;
use super::trajectory::Trajectory;
use prettytable::{Table, row};

/// (initial_substrate - product) / initial_substrate
pub fn remaining_substrate_fraction(config: &CouplingConfig, state: &State) -> f64 {
    (config.initial.substrate - state.product) / config.initial.substrate
}

pub fn conversion(config: &CouplingConfig, state: &State) -> f64 {
    1.0 - remaining_substrate_fraction(config, state)
}

/// first grid time at which the conversion reaches `target` (0..1)
pub fn first_time_reaching_conversion(
    config: &CouplingConfig,
    trajectory: &Trajectory,
    target: f64,
) -> Option<f64> {
    trajectory
        .iter()
        .find(|(_, state)| conversion(config, state) >= target)
        .map(|(t, _)| t)
}

/// largest |product_a - product_b| over two trajectories on the same grid
pub fn max_product_deviation(a: &Trajectory, b: &Trajectory) -> f64 {
    a.states
        .iter()
        .zip(b.states.iter())
        .map(|(sa, sb)| (sa.product - sb.product).abs())
        .fold(0.0, f64::max)
}

fn sampled_indices(len: usize, every: usize) -> Vec<usize> {
    let every = every.max(1);
    let mut indices: Vec<usize> = (0..len).step_by(every).collect();
    if len > 0 && indices.last() != Some(&(len - 1)) {
        indices.push(len - 1);
    }
    indices
}

/// Prints every `every`-th state and the last one
pub fn pretty_print_trajectory(config: &CouplingConfig, trajectory: &Trajectory, every: usize) {
    println!(
        "__________{} trajectory, dt = {}__________",
        trajectory.method,
        trajectory.dt()
    );
    let mut table = Table::new();
    table.add_row(row![
        "t",
        "protonated SM",
        "protonated base",
        "product",
        "hydrolyzed",
        "SM remaining, %"
    ]);
    for i in sampled_indices(trajectory.len(), every) {
        let s = &trajectory.states[i];
        table.add_row(row![
            format!("{:.3}", trajectory.time(i)),
            format!("{:.4e}", s.protonated_substrate),
            format!("{:.4e}", s.protonated_base),
            format!("{:.6}", s.product),
            format!("{:.6}", s.hydrolyzed),
            format!("{:.3}", 100.0 * remaining_substrate_fraction(config, s)),
        ]);
    }
    table.printstd();
}

/// Prints the product of both trajectories side by side
pub fn pretty_print_comparison(primary: &Trajectory, reference: &Trajectory, every: usize) {
    let primary_name = primary.method.to_string();
    let reference_name = reference.method.to_string();
    println!(
        "__________product: {} vs {}__________",
        primary_name, reference_name
    );
    let mut table = Table::new();
    table.add_row(row!["t", primary_name, reference_name, "difference"]);
    let len = primary.len().min(reference.len());
    for i in sampled_indices(len, every) {
        let a = primary.states[i].product;
        let b = reference.states[i].product;
        table.add_row(row![
            format!("{:.3}", primary.time(i)),
            format!("{:.8}", a),
            format!("{:.8}", b),
            format!("{:.3e}", a - b),
        ]);
    }
    table.printstd();
    println!(
        "max deviation: {:.3e}",
        max_product_deviation(primary, reference)
    );
}
