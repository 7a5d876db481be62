//! Admin-to-role link types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mall_core::{AdminId, AdminRoleId, RoleId};

/// A live link granting a role to an admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRoleLink {
    /// Database ID of the link row.
    pub id: AdminRoleId,
    /// Admin holding the role.
    pub admin_id: AdminId,
    /// Granted role.
    pub role_id: RoleId,
    /// When the role was granted.
    pub created_at: DateTime<Utc>,
}
