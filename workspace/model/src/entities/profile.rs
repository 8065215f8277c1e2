use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Maximum length of the free-text location on a profile.
pub const MAX_LOCATION_LEN: u64 = 100;

/// A contact number, when present, is exactly this many digits.
pub const CONTACT_NUMBER_LEN: usize = 10;

/// The role an account holds in the community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Role {
    #[sea_orm(string_value = "resident")]
    Resident,
    #[sea_orm(string_value = "authority")]
    Authority,
    #[sea_orm(string_value = "officer")]
    Officer,
    #[sea_orm(string_value = "chief")]
    Chief,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Resident => "resident",
            Role::Authority => "authority",
            Role::Officer => "officer",
            Role::Chief => "chief",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resident" => Ok(Role::Resident),
            "authority" => Ok(Role::Authority),
            "officer" => Ok(Role::Officer),
            "chief" => Ok(Role::Chief),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Role profile for an account. Exactly one per account, created in the
/// same transaction as the account itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    pub role: Role,
    pub contact_number: Option<String>,
    pub location: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AccountId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
