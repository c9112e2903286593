pub mod compose;
pub mod driver;
pub mod plan;

pub use crate::domain::model::{DeployReport, Profile, Step, StepOutcome};
pub use crate::domain::ports::{CommandRunner, ConfigProvider, HealthProbe};
pub use crate::utils::error::Result;
