#![deny(missing_docs)]
#![doc = "Core traits and data types for the DES loading stack."]

pub mod canonical;
pub mod concentration;
pub mod errors;
pub mod launch;
pub mod position;
pub mod provenance;
pub mod rng;

pub use canonical::{stable_hash_string, to_canonical_json_bytes};
pub use concentration::Concentration;
pub use errors::{DesError, ErrorInfo};
pub use launch::{LaunchJob, LaunchReport};
pub use position::{Euclidean2D, Position};
pub use provenance::{LoadProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
