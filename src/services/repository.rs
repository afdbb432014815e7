//! Generic data-access helpers shared by the CRUD handlers

use sea_orm::{
    ConnectionTrait, EntityTrait, PaginatorTrait, PrimaryKeyTrait, QuerySelect, Select,
};

use crate::error::ApiError;
use crate::models::common::ListQuery;

/// Fetch a row by integer primary key, or 404
pub async fn find_by_id_or_404<E, C>(db: &C, id: i32) -> Result<E::Model, ApiError>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    E::find_by_id(id).one(db).await?.ok_or_else(|| {
        ApiError::NotFound(format!(
            "{} {} not found",
            singular(E::default().table_name()),
            id
        ))
    })
}

/// Run a filtered select with the list query's limit/offset.
/// Returns the page and the total row count.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    query: &ListQuery,
) -> Result<(Vec<E::Model>, u64), ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;
    let items = select
        .offset(query.offset())
        .limit(query.limit())
        .all(db)
        .await?;

    Ok((items, total))
}

/// `orders` -> `Order`, for error messages
fn singular(table: &str) -> String {
    let name = table.strip_suffix('s').unwrap_or(table);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular() {
        assert_eq!(singular("orders"), "Order");
        assert_eq!(singular("consolidations"), "Consolidation");
        assert_eq!(singular(""), "");
    }
}
