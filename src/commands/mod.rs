pub mod gke;

pub use gke::GkeCommand;
