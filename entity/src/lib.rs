//! Sea-ORM entity definitions for the jobtrail schema.

pub mod job_applications;
pub mod refresh_tokens;
pub mod users;

pub use job_applications::Entity as JobApplications;
pub use refresh_tokens::Entity as RefreshTokens;
pub use users::Entity as Users;
