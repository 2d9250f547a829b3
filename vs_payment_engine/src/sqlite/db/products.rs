use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::Product;

/// Fetches the currently-active products among `ids`. The caller is responsible for collapsing duplicate ids
/// first; the result length is compared against the deduplicated id count to detect missing or inactive
/// products.
pub async fn fetch_active_products(ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE is_active = 1 AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}
