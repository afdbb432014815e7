//! Row-level visibility per caller
//!
//! Admins see everything. Customers see their own orders and the
//! consolidations/payments those orders belong to. Suppliers see orders
//! placed with supplier profiles they own, and the matching consolidations.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
};

use crate::auth::Caller;
use crate::entities::{orders, prelude::*, suppliers};
use crate::error::ApiError;
use crate::services::access_policy::Role;

/// Supplier profile ids owned by the caller
pub async fn owned_supplier_ids<C>(db: &C, caller: &Caller) -> Result<Vec<i32>, ApiError>
where
    C: ConnectionTrait,
{
    Ok(Suppliers::find()
        .select_only()
        .column(suppliers::Column::Id)
        .filter(suppliers::Column::OwnerId.eq(caller.user_id))
        .into_tuple::<i32>()
        .all(db)
        .await?)
}

/// Filter on the orders table for what the caller may see
pub async fn order_condition<C>(db: &C, caller: &Caller) -> Result<Condition, ApiError>
where
    C: ConnectionTrait,
{
    Ok(match caller.role {
        Role::Admin => Condition::all(),
        Role::Customer => Condition::all().add(orders::Column::BuyerId.eq(caller.user_id)),
        Role::Supplier => {
            let ids = owned_supplier_ids(db, caller).await?;
            Condition::all().add(orders::Column::SupplierId.is_in(ids))
        }
    })
}

/// Can the caller see this order?
pub async fn can_see_order<C>(db: &C, caller: &Caller, order: &orders::Model) -> Result<bool, ApiError>
where
    C: ConnectionTrait,
{
    Ok(match caller.role {
        Role::Admin => true,
        Role::Customer => order.buyer_id == caller.user_id,
        Role::Supplier => owned_supplier_ids(db, caller).await?.contains(&order.supplier_id),
    })
}

/// Consolidation ids the caller may see; `None` means unrestricted
pub async fn visible_consolidation_ids<C>(db: &C, caller: &Caller) -> Result<Option<Vec<i32>>, ApiError>
where
    C: ConnectionTrait,
{
    if caller.is_admin() {
        return Ok(None);
    }

    let condition = order_condition(db, caller).await?;
    let mut ids: Vec<i32> = Orders::find()
        .select_only()
        .column(orders::Column::ConsolidationId)
        .filter(condition)
        .filter(orders::Column::ConsolidationId.is_not_null())
        .distinct()
        .into_tuple::<Option<i32>>()
        .all(db)
        .await?
        .into_iter()
        .flatten()
        .collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(Some(ids))
}

/// Can the caller see this consolidation?
pub async fn can_see_consolidation<C>(db: &C, caller: &Caller, consolidation_id: i32) -> Result<bool, ApiError>
where
    C: ConnectionTrait,
{
    Ok(match visible_consolidation_ids(db, caller).await? {
        None => true,
        Some(ids) => ids.contains(&consolidation_id),
    })
}
