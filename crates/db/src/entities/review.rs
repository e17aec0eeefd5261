//! Review entity (post-stay feedback).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a review targets.
///
/// An owner may only author `Tenant` reviews; a tenant authors `Property`
/// and `Owner` reviews and never `Tenant` (no self-review).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum ReviewKind {
    #[sea_orm(string_value = "property")]
    Property,
    #[sea_orm(string_value = "owner")]
    Owner,
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub author_id: String,

    pub sejour_id: String,

    pub kind: ReviewKind,

    /// The offer id for `Property` reviews, a user id otherwise.
    pub target_id: String,

    /// Rating from 1 to 5.
    pub rating: i16,

    #[sea_orm(nullable)]
    pub comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::sejour::Entity",
        from = "Column::SejourId",
        to = "super::sejour::Column::Id",
        on_delete = "Cascade"
    )]
    Sejour,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::sejour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sejour.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
