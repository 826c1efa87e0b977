pub mod batch;
pub mod config;
pub mod location;
pub mod observation;
