//! Sejour entity (the realized occupancy from an accepted application).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sejour status. `Ended` is terminal; séjours are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum SejourStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "ended")]
    Ended,
}

/// Sejour model.
///
/// Invariants, backed by partial unique indexes on the table:
/// - at most one `active` séjour per `tenant_id`
/// - at most one `active` séjour per `offer_id`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sejour")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub owner_id: String,

    pub tenant_id: String,

    pub offer_id: String,

    pub application_id: String,

    pub status: SejourStatus,

    pub start_date: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub end_date: Option<DateTimeWithTimeZone>,

    /// The owner's single feedback obligation (rate the tenant).
    pub owner_feedback_given: bool,

    /// Set once the tenant has rated both the property and the owner.
    pub tenant_feedback_given: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TenantId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,

    #[sea_orm(
        belongs_to = "super::offer::Entity",
        from = "Column::OfferId",
        to = "super::offer::Column::Id",
        on_delete = "Cascade"
    )]
    Offer,

    #[sea_orm(
        belongs_to = "super::application::Entity",
        from = "Column::ApplicationId",
        to = "super::application::Column::Id",
        on_delete = "Cascade"
    )]
    Application,

    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
