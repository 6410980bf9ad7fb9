pub mod batch;
pub mod run;
pub mod snapshot;
pub mod validate;
