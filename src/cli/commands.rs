use clap::Subcommand;

use super::config::ConfigArgs;
use super::simulate::SimulateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Inspect the resolved retry settings
    Config(ConfigArgs),

    /// Run a widget against a scripted testable and report what the engine did
    Simulate(SimulateArgs),
}
