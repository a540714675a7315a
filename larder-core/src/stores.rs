//! Store management.
//!
//! Stores are referenced (never owned) by pantry items, staples, and known
//! prices. Deleting a store nulls out those references first.

use diesel::prelude::*;

use crate::error::{CoreError, CoreResult};
use crate::models::{Store, StoreInput};
use crate::schema::{known_prices, pantry, staples, stores};

pub fn get_all(conn: &mut SqliteConnection) -> CoreResult<Vec<Store>> {
    Ok(stores::table
        .order(stores::name.asc())
        .select(Store::as_select())
        .load(conn)?)
}

pub fn get(conn: &mut SqliteConnection, store_id: i32) -> CoreResult<Option<Store>> {
    Ok(stores::table
        .find(store_id)
        .select(Store::as_select())
        .first(conn)
        .optional()?)
}

/// Insert a new store. Uniqueness is pre-checked so a duplicate surfaces as
/// `AlreadyExists` rather than a storage constraint failure.
pub fn add(conn: &mut SqliteConnection, input: &StoreInput) -> CoreResult<i32> {
    let name = input.name.trim();
    let existing: Option<i32> = stores::table
        .filter(stores::name.eq(name))
        .select(stores::id)
        .first(conn)
        .optional()?;
    if existing.is_some() {
        return Err(CoreError::AlreadyExists {
            kind: "store",
            name: name.to_string(),
        });
    }

    let id = diesel::insert_into(stores::table)
        .values((
            stores::name.eq(name),
            stores::location.eq(input.location.as_deref()),
            stores::notes.eq(input.notes.as_deref()),
        ))
        .returning(stores::id)
        .get_result(conn)?;
    Ok(id)
}

pub fn update(conn: &mut SqliteConnection, store_id: i32, input: &StoreInput) -> CoreResult<()> {
    diesel::update(stores::table.find(store_id))
        .set((
            stores::name.eq(input.name.trim()),
            stores::location.eq(input.location.as_deref()),
            stores::notes.eq(input.notes.as_deref()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Delete a store, nulling every reference to it beforehand.
pub fn delete(conn: &mut SqliteConnection, store_id: i32) -> CoreResult<()> {
    diesel::update(pantry::table.filter(pantry::preferred_store_id.eq(store_id)))
        .set(pantry::preferred_store_id.eq(None::<i32>))
        .execute(conn)?;
    diesel::update(staples::table.filter(staples::preferred_store_id.eq(store_id)))
        .set(staples::preferred_store_id.eq(None::<i32>))
        .execute(conn)?;
    diesel::update(known_prices::table.filter(known_prices::store_id.eq(store_id)))
        .set(known_prices::store_id.eq(None::<i32>))
        .execute(conn)?;
    diesel::delete(stores::table.find(store_id)).execute(conn)?;
    Ok(())
}

/// Return the id for a store name, creating the store on first reference.
/// Blank names resolve to `None`.
pub fn get_or_create(conn: &mut SqliteConnection, name: &str) -> CoreResult<Option<i32>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let existing: Option<i32> = stores::table
        .filter(stores::name.eq(name))
        .select(stores::id)
        .first(conn)
        .optional()?;
    if let Some(id) = existing {
        return Ok(Some(id));
    }

    let id = diesel::insert_into(stores::table)
        .values(stores::name.eq(name))
        .returning(stores::id)
        .get_result(conn)?;
    tracing::debug!(store = name, "auto-created store");
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn input(name: &str) -> StoreInput {
        StoreInput {
            name: name.to_string(),
            location: None,
            notes: None,
        }
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut conn = connect_in_memory();
        add(&mut conn, &input("Safeway")).unwrap();
        let err = add(&mut conn, &input("Safeway")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { kind: "store", .. }));
    }

    #[test]
    fn get_or_create_reuses_existing() {
        let mut conn = connect_in_memory();
        let first = get_or_create(&mut conn, "Costco").unwrap().unwrap();
        let second = get_or_create(&mut conn, "Costco").unwrap().unwrap();
        assert_eq!(first, second);
        assert!(get_or_create(&mut conn, "   ").unwrap().is_none());
    }

    #[test]
    fn delete_nulls_references() {
        let mut conn = connect_in_memory();
        let store_id = add(&mut conn, &input("Aldi")).unwrap();
        crate::staples::add(
            &mut conn,
            &crate::models::StapleInput {
                name: "salt".to_string(),
                category: None,
                preferred_store_id: Some(store_id),
                need_to_buy: false,
            },
        )
        .unwrap();

        delete(&mut conn, store_id).unwrap();

        let staple = crate::staples::get_by_name(&mut conn, "salt").unwrap().unwrap();
        assert_eq!(staple.preferred_store_id, None);
        assert!(get(&mut conn, store_id).unwrap().is_none());
    }
}
