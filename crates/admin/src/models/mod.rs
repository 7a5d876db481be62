//! Domain models for the admin account service.

pub mod admin;
pub mod admin_role;

pub use admin::{
    Admin, AdminAdd, AdminChanges, AdminPage, AdminPageQuery, AdminUpdate, AdminView,
    AuthenticatedAdmin, HashedPassword, NewAdmin,
};
pub use admin_role::AdminRoleLink;
