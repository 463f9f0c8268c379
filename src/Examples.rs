/// numbered demonstration tasks: reference scenario, hydrolysis, grid refinement, failing grid
pub mod coupling_examples;
