use crate::CouplingKinetics::coupling_output::{
    conversion, first_time_reaching_conversion, pretty_print_comparison, pretty_print_trajectory,
    remaining_substrate_fraction,
};
use crate::CouplingKinetics::coupling_task::{CouplingConfig, CouplingTask, Method, TimeGrid};
use crate::CouplingKinetics::trajectory::{CouplingIVP, integrate};
use approx::assert_relative_eq;

pub fn coupling_examples(task: usize) {
    match task {
        0 => {
            // reference scenario: ABM4 with RK4 cross-check, ~99% conversion at t = 5
            let mut ivp = CouplingIVP::new(CouplingTask::default());
            ivp.set_method(Method::ABM4);
            ivp.set_reference(true);
            if let Err(e) = ivp.solve() {
                println!("Error: {}", e);
                return;
            }
            let config = ivp.task.config;
            let abm4 = ivp.get_solution().unwrap();
            let rk4 = ivp.get_reference().unwrap();
            pretty_print_trajectory(&config, abm4, 50);
            pretty_print_comparison(abm4, rk4, 100);

            let at_5 = abm4.at_time(5.0).unwrap();
            let remaining = remaining_substrate_fraction(&config, at_5);
            println!("SM remaining at t = 5: {:.3} %", 100.0 * remaining);
            assert_relative_eq!(remaining, 0.01, epsilon = 1e-3);
        }
        1 => {
            // competing hydrolysis eats the monomer
            let mut config = CouplingConfig::default();
            config.constants.k_hydrolysis = 0.5;
            let grid = TimeGrid::new(20.0, 1000);
            match integrate(&config, &grid, Method::ABM4, 1e-12) {
                Ok(trajectory) => {
                    pretty_print_trajectory(&config, &trajectory, 100);
                    let last = trajectory.last().unwrap();
                    println!(
                        "final conversion {:.2} %, hydrolyzed monomer {:.5} M",
                        100.0 * conversion(&config, last),
                        last.hydrolyzed
                    );
                    match first_time_reaching_conversion(&config, &trajectory, 0.9) {
                        Some(t) => println!("90% conversion reached at t = {:.2}", t),
                        None => println!("90% conversion is not reached"),
                    }
                }
                Err(e) => println!("Error: {}", e),
            }
        }
        2 => {
            // refining the grid: ABM4 and RK4 approach the same limit
            let mut config = CouplingConfig::default();
            config.constants.k_hydrolysis = 0.5;
            for n in [50, 100, 200, 400, 800] {
                let grid = TimeGrid::new(5.0, n);
                let abm4 = integrate(&config, &grid, Method::ABM4, 1e-12);
                let rk4 = integrate(&config, &grid, Method::RK4, 1e-12);
                match (abm4, rk4) {
                    (Ok(abm4), Ok(rk4)) => {
                        let a = abm4.last().unwrap().product;
                        let b = rk4.last().unwrap().product;
                        println!(
                            "N = {:4}: ABM4 {:.12}  RK4 {:.12}  |diff| {:.3e}",
                            n,
                            a,
                            b,
                            (a - b).abs()
                        );
                    }
                    (Err(e), _) | (_, Err(e)) => println!("N = {}: {}", n, e),
                }
            }
        }
        3 => {
            // a grid that is far too coarse fails with the step and the quantity
            let task = CouplingTask::new(
                CouplingConfig::default(),
                TimeGrid::new(20.0, 4),
                Method::ABM4,
            );
            let mut ivp = CouplingIVP::new(task);
            match ivp.solve() {
                Ok(()) => println!("unexpectedly solved"),
                Err(e) => println!("Error: {}", e),
            }
        }
        _ => {
            println!("Wrong task number");
        }
    }
}
