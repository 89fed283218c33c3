pub mod project;
pub mod user;

pub use project::{FieldErrors, Project, ProjectParams};
pub use user::{Access, User};
