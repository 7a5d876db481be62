//! Admin account management commands.
//!
//! Each command runs one `AdminService` operation and prints its
//! `CommonResult` as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! mall-cli admin create -u operator -n "Han Meimei" -p buzhidao
//! mall-cli admin list --nickname han --page 0 --size 20
//! mall-cli --actor 1 admin status 7 2
//! mall-cli --actor 1 admin delete 7
//! ```

use secrecy::SecretString;
use serde::Serialize;

use mall_admin::config::AdminConfig;
use mall_admin::db::{self, PgAdminStore, PgTokenRevoker};
use mall_admin::models::{AdminAdd, AdminPageQuery, AdminUpdate};
use mall_admin::{AdminService, CommonResult};
use mall_core::AdminId;

use super::CommandError;

/// Service wired to `PostgreSQL`.
pub type PgAdminService = AdminService<PgAdminStore, PgTokenRevoker>;

/// An admin account operation requested on the command line.
#[derive(Debug)]
pub enum AdminCommand {
    Verify {
        username: String,
        password: SecretString,
    },
    List(AdminPageQuery),
    Roles(AdminId),
    Create(AdminAdd),
    Update(AdminUpdate),
    Status {
        target: AdminId,
        status: i32,
    },
    Delete(AdminId),
}

/// Connect to the admin database and build the service.
///
/// # Errors
///
/// Returns `CommandError::Database` if the pool cannot connect.
pub async fn connect(config: &AdminConfig) -> Result<PgAdminService, CommandError> {
    let pool = db::create_pool(config).await?;
    Ok(AdminService::new(PgAdminStore::new(pool), PgTokenRevoker))
}

/// Run one admin command as `actor` and print the result.
///
/// Returns whether the operation succeeded.
///
/// # Errors
///
/// Returns `CommandError::Output` if the result cannot be serialized.
pub async fn run(
    service: &PgAdminService,
    actor: AdminId,
    command: AdminCommand,
) -> Result<bool, CommandError> {
    match command {
        AdminCommand::Verify { username, password } => {
            print_result(service.validate_admin(&username, &password).await.into())
        }
        AdminCommand::List(query) => print_result(service.get_admin_page(&query).await.into()),
        AdminCommand::Roles(admin_id) => {
            print_result(service.get_admin_roles(admin_id).await.into())
        }
        AdminCommand::Create(input) => print_result(service.add_admin(actor, input).await.into()),
        AdminCommand::Update(input) => {
            print_result(service.update_admin(actor, input).await.map(|()| true).into())
        }
        AdminCommand::Status { target, status } => print_result(
            service
                .update_admin_status(actor, target, status)
                .await
                .map(|()| true)
                .into(),
        ),
        AdminCommand::Delete(target) => print_result(
            service
                .delete_admin(actor, target)
                .await
                .map(|()| true)
                .into(),
        ),
    }
}

fn print_result<T: Serialize>(result: CommonResult<T>) -> Result<bool, CommandError> {
    let json = serde_json::to_string_pretty(&result)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }

    Ok(result.is_success())
}
