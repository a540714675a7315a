//! Known prices — receipt-sourced or hand-entered grocery prices.
//!
//! These take priority over recipe ingredient prices and pantry estimates
//! when the shopping list resolves a unit price.

use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db::{fold_name, lower};
use crate::error::CoreResult;
use crate::models::KnownPrice;
use crate::schema::known_prices;

/// One price entry for `upsert`/`bulk_upsert`, keyed by case-insensitive
/// item name.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PriceUpdate {
    pub item_name: String,
    pub unit_price: f64,
    pub unit: Option<String>,
    pub store_id: Option<i32>,
}

pub fn get_all(conn: &mut SqliteConnection) -> CoreResult<Vec<KnownPrice>> {
    Ok(known_prices::table
        .order(known_prices::item_name.asc())
        .select(KnownPrice::as_select())
        .load(conn)?)
}

pub fn get_by_name(conn: &mut SqliteConnection, item_name: &str) -> CoreResult<Option<KnownPrice>> {
    Ok(known_prices::table
        .filter(lower(known_prices::item_name).eq(fold_name(item_name)))
        .select(KnownPrice::as_select())
        .first(conn)
        .optional()?)
}

/// Insert or update a price entry. Matching is by case-insensitive name;
/// updates refresh the last_updated timestamp.
pub fn upsert(conn: &mut SqliteConnection, price: &PriceUpdate) -> CoreResult<()> {
    let existing: Option<i32> = known_prices::table
        .filter(lower(known_prices::item_name).eq(fold_name(&price.item_name)))
        .select(known_prices::id)
        .first(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(known_prices::table.find(id))
                .set((
                    known_prices::unit_price.eq(price.unit_price),
                    known_prices::unit.eq(price.unit.as_deref()),
                    known_prices::store_id.eq(price.store_id),
                    known_prices::last_updated.eq(diesel::dsl::now),
                ))
                .execute(conn)?;
        }
        None => {
            diesel::insert_into(known_prices::table)
                .values((
                    known_prices::item_name.eq(price.item_name.trim()),
                    known_prices::unit_price.eq(price.unit_price),
                    known_prices::unit.eq(price.unit.as_deref()),
                    known_prices::store_id.eq(price.store_id),
                ))
                .execute(conn)?;
        }
    }
    Ok(())
}

/// Upsert a batch of price entries, e.g. from a parsed receipt. Returns the
/// count processed.
pub fn bulk_upsert(conn: &mut SqliteConnection, prices: &[PriceUpdate]) -> CoreResult<usize> {
    for price in prices {
        upsert(conn, price)?;
    }
    Ok(prices.len())
}

pub fn delete(conn: &mut SqliteConnection, price_id: i32) -> CoreResult<()> {
    diesel::delete(known_prices::table.find(price_id)).execute(conn)?;
    Ok(())
}
