//! User entity (owners, tenants and admins share one table).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gender declared on a profile, also used as a roommate preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub username: String,

    /// Lowercase copy for case-insensitive uniqueness checks.
    pub username_lower: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Bearer token for API authentication.
    #[serde(skip_serializing)]
    #[sea_orm(nullable)]
    pub token: Option<String>,

    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    #[sea_orm(nullable)]
    pub bio: Option<String>,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    pub is_admin: bool,
    pub is_suspended: bool,

    /// Set once the preference wizard has been completed.
    pub onboarding_completed: bool,

    // Preference fields, used only for the descriptive compatibility score.
    #[sea_orm(nullable)]
    pub budget_min: Option<i32>,
    #[sea_orm(nullable)]
    pub budget_max: Option<i32>,
    pub smoker: bool,
    pub has_pets: bool,
    pub accepts_visitors: bool,
    pub party_friendly: bool,
    #[sea_orm(nullable)]
    pub gender: Option<Gender>,
    #[sea_orm(nullable)]
    pub preferred_gender: Option<Gender>,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offer::Entity")]
    Offers,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,

    #[sea_orm(has_many = "super::id_document::Entity")]
    IdDocuments,
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::id_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IdDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
