pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod simulation;
pub mod tester;

pub use policy::GameplayStrategy;
pub use scenarios::{find_scenario, list_scenarios};
pub use tester::*;
