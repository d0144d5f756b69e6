pub mod experiments;
pub mod instances;
pub mod monitor;
pub mod window;
