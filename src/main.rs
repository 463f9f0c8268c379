use PMOcoupling::CouplingKinetics::coupling_output::{
    pretty_print_comparison, pretty_print_trajectory,
};
use PMOcoupling::CouplingKinetics::coupling_task::CouplingTask;
use PMOcoupling::CouplingKinetics::trajectory::CouplingIVP;
use PMOcoupling::Examples::coupling_examples::coupling_examples;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn solve_task_file(path: &str) {
    let task = match CouplingTask::from_json_file(path) {
        Ok(task) => task,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let mut ivp = CouplingIVP::new(task);
    if let Err(e) = ivp.solve() {
        println!("Error: {}", e);
        return;
    }
    let config = ivp.task.config;
    let every = (ivp.task.grid.n_steps / 20).max(1);
    if let Some(solution) = ivp.get_solution() {
        pretty_print_trajectory(&config, solution, every);
        if let Some(reference) = ivp.get_reference() {
            pretty_print_comparison(solution, reference, every);
        }
    }
}

pub fn main() {
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger not initialized: {}", e);
    }
    match std::env::args().nth(1) {
        Some(path) => solve_task_file(&path),
        None => {
            let task: usize = 0;
            coupling_examples(task);
        }
    }
}
