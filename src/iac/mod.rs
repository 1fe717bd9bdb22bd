pub mod executor;
pub mod terraform;
pub mod workspace;

pub use executor::IacExecutor;
pub use terraform::TerraformExecutor;
pub use workspace::{ClusterWorkspace, WorkspaceRenderer};
