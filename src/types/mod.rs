mod issue;
mod label;
mod priority;
mod project;
mod team;
mod user;

pub use issue::{Issue, IssueFields, WorkflowState};
pub use label::Label;
pub use priority::Priority;
pub use project::Project;
pub use team::Team;
pub use user::User;
