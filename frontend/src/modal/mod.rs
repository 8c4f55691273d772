pub mod kinds;
pub mod provider;
pub mod queue;
