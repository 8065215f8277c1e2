use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

pub const MAX_TITLE_LEN: u64 = 200;
pub const MAX_DESCRIPTION_LEN: u64 = 2000;
pub const MAX_LOCATION_LEN: u64 = 200;

/// Where in the lifecycle an incident sits. `Confirmed` is the terminal
/// branch reached by officer confirmation of a pending report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum IncidentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IncidentStatus::Pending),
            "in_progress" => Ok(IncidentStatus::InProgress),
            "resolved" => Ok(IncidentStatus::Resolved),
            "confirmed" => Ok(IncidentStatus::Confirmed),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// The kind of incident being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
pub enum Category {
    #[sea_orm(string_value = "suspicious_activity")]
    SuspiciousActivity,
    #[sea_orm(string_value = "emergency")]
    Emergency,
    #[sea_orm(string_value = "disturbance")]
    Disturbance,
    #[sea_orm(string_value = "other")]
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::SuspiciousActivity => "suspicious_activity",
            Category::Emergency => "emergency",
            Category::Disturbance => "disturbance",
            Category::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suspicious_activity" => Ok(Category::SuspiciousActivity),
            "emergency" => Ok(Category::Emergency),
            "disturbance" => Ok(Category::Disturbance),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// A reported incident. `reporter_id` and `time_reported` are set once at
/// creation and never change; media columns hold opaque references into the
/// blob store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reporter_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Category,
    pub location: Option<String>,
    pub time_reported: DateTimeUtc,
    pub status: IncidentStatus,
    /// Seconds between report and first confirmation/resolution. Analytics
    /// only; never drives behavior.
    pub response_time_secs: Option<i64>,
    pub confirmed_by_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub response_notes: Option<String>,
    pub image_ref: Option<String>,
    pub video_ref: Option<String>,
    pub audio_ref: Option<String>,
    pub document_ref: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id"
    )]
    Reporter,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ConfirmedById",
        to = "super::user::Column::Id"
    )]
    ConfirmedBy,
}

impl ActiveModelBehavior for ActiveModel {}
