pub mod plan;
pub mod replay;

pub use plan::RunPlan;
pub use replay::replay;
