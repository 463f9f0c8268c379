#[allow(non_snake_case)]
pub mod CouplingKinetics;
#[allow(non_snake_case)]
pub mod Examples;
