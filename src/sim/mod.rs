/// Timestep sequencing.
pub mod clock;
pub mod controller;
pub mod engine;
pub mod kpi;
pub mod types;
