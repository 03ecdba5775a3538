//! Product business logic - Handles all catalog operations.
//!
//! Products are created by the admin (bot wizard or admin API), listed in the
//! customer catalog, and deleted outright. Orders keep their own snapshot of name
//! and price, so a hard delete is safe.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Parses a price typed by a human, ignoring spaces and thousands separators.
///
/// `"1 000"`, `"1,000"` and `"1000"` all yield `1000`. Negative values are rejected.
///
/// # Errors
/// Returns [`Error::InvalidPrice`] when the remaining text is not a non-negative integer.
pub fn parse_price(input: &str) -> Result<i64> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    match cleaned.parse::<i64>() {
        Ok(price) if price >= 0 => Ok(price),
        _ => Err(Error::InvalidPrice {
            input: input.to_string(),
        }),
    }
}

/// Retrieves the whole catalog ordered by id, which is also creation order.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product after validating the name and price.
///
/// The name, description and emoji are trimmed before they are stored.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
    price: i64,
    emoji: &str,
) -> Result<product::Model> {
    validate(name, price)?;

    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description.trim().to_string()),
        price: Set(price),
        emoji: Set(emoji.trim().to_string()),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of an existing product.
///
/// # Errors
/// Returns an error if validation fails, the product does not exist, or the
/// update fails.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    name: &str,
    description: &str,
    price: i64,
    emoji: &str,
) -> Result<product::Model> {
    validate(name, price)?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    product.name = Set(name.trim().to_string());
    product.description = Set(description.trim().to_string());
    product.price = Set(price);
    product.emoji = Set(emoji.trim().to_string());

    product.update(db).await.map_err(Into::into)
}

/// Removes a product from the catalog.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if nothing was deleted.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { id: product_id });
    }
    Ok(())
}

fn validate(name: &str, price: i64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if price < 0 {
        return Err(Error::InvalidPrice {
            input: price.to_string(),
        });
    }
    Ok(())
}
