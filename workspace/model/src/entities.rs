//! This file serves as the root for all SeaORM entity modules.
//! Accounts, their role profiles, and incident reports live here; the
//! policy and lifecycle layers build on these types.

pub mod incident;
pub mod profile;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::incident::Entity as Incident;
    pub use super::profile::Entity as Profile;
    pub use super::user::Entity as User;
}
