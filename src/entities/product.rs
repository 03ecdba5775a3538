//! Product entity - Represents an item in the shop catalog.
//!
//! Products are created and deleted by the admin, either through the bot's
//! add-product wizard or through the admin API. Orders snapshot the product's
//! name and price, so deleting a product never rewrites order history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Gift box")
    pub name: String,
    /// Free-form description shown on the product card
    pub description: String,
    /// Display price in whole currency units
    pub price: i64,
    /// Short decorative prefix shown next to the name
    pub emoji: String,
}

/// Products have no outgoing relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
