//! Offer entity (a rentable colocation listing).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Offer lifecycle status.
///
/// Created `Draft` or `Pending`; becomes `Active` through admin approval,
/// `Rented` while a stay occupies it, and back to `Active` when the stay
/// ends. `Rejected` and `Closed` are set by moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum OfferStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "rented")]
    Rented,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub owner_id: String,

    pub title: String,

    pub description: String,

    /// Monthly rent in euros.
    pub price: i32,

    pub city: String,

    pub address: String,

    pub postal_code: String,

    #[sea_orm(nullable)]
    pub surface_m2: Option<i32>,

    #[sea_orm(nullable)]
    pub rooms: Option<i32>,

    // Amenities
    pub furnished: bool,
    pub wifi: bool,
    pub washing_machine: bool,
    pub parking: bool,

    // House rules, compared against tenant preferences for the
    // compatibility score.
    pub smoking_allowed: bool,
    pub pets_allowed: bool,
    pub visitors_allowed: bool,
    pub party_allowed: bool,

    pub status: OfferStatus,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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

    #[sea_orm(has_many = "super::offer_image::Entity")]
    Images,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::offer_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
