//! Simulation description loading for the DES stack.
//!
//! A [`SimulationLoader`] parses a YAML description, validates its variable
//! catalog, and produces [`InitializedEnvironment`]s for caller-supplied
//! binding sets. The [`Loader`] trait is the contract; launchers run the
//! described simulation(s) and emit deterministic reports.

mod description;
mod environment;
mod launchers;
mod loader;
mod remote;

pub use description::{
    Deployment, LauncherConfig, RemoteDependency, SimulationDescription,
};
pub use environment::{InitializedEnvironment, Node};
pub use launchers::{BatchLauncher, HeadlessLauncher, Launcher};
pub use loader::{Loader, LoaderSnapshot, SimulationLoader, SCHEMA_VERSION};
pub use remote::resolve_remote_dependencies;
