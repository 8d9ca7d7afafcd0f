//! Record shapes returned by the intra API

pub mod coalition;
pub mod location;
pub mod project;

pub use coalition::CoalitionUser;
pub use location::{LocationRecord, RawLocation, Session};
pub use project::{CursusProject, ProjectRef, ProjectUser, UserRef};
