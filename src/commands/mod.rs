pub mod create;
pub mod drop;
pub mod plan;

pub use create::{execute_create, CreateResult};
pub use drop::{execute_drop, DropResult};
pub use plan::{execute_plan, PlanResult};

#[cfg(feature = "cli")]
pub use create::print_create_summary;
#[cfg(feature = "cli")]
pub use drop::print_drop_summary;
#[cfg(feature = "cli")]
pub use plan::print_plan_summary;
