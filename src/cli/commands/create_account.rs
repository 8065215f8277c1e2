use anyhow::{bail, Result};
use model::entities::{profile, user};
use sea_orm::{ActiveModelTrait, Database, Set, TransactionTrait};
use std::str::FromStr;
use tracing::info;

/// Create an account and its role profile directly in the database.
///
/// Used to bootstrap the first admin or seed officers and chiefs, since
/// the API's registration endpoint only produces residents.
pub async fn create_account(
    database_url: &str,
    username: &str,
    role: &str,
    superuser: bool,
    contact_number: Option<String>,
    location: Option<String>,
) -> Result<()> {
    let role = match profile::Role::from_str(role) {
        Ok(role) => role,
        Err(message) => bail!(message),
    };
    if let Some(number) = &contact_number {
        if number.len() != profile::CONTACT_NUMBER_LEN
            || !number.chars().all(|c| c.is_ascii_digit())
        {
            bail!("Phone number must be exactly 10 digits.");
        }
    }

    let db = Database::connect(database_url).await?;
    let txn = db.begin().await?;

    let account = user::ActiveModel {
        username: Set(username.to_string()),
        is_superuser: Set(superuser),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    profile::ActiveModel {
        account_id: Set(account.id),
        role: Set(role),
        contact_number: Set(contact_number),
        location: Set(location),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Account created: {} (id {}, role {}, superuser {})",
        account.username, account.id, role, superuser
    );
    println!("Created account {} with id {}", account.username, account.id);
    Ok(())
}
