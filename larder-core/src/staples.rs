//! Staples — items the user normally keeps on hand, tracked independently of
//! pantry stock. The need_to_buy toggle is set by the user only, never
//! derived; items marked as needed appear on shopping lists.

use diesel::prelude::*;

use crate::db::{fold_name, lower};
use crate::error::{CoreError, CoreResult};
use crate::models::{Staple, StapleInput};
use crate::schema::{pantry, staples};

pub fn get_all(conn: &mut SqliteConnection) -> CoreResult<Vec<Staple>> {
    Ok(staples::table
        .order(staples::name.asc())
        .select(Staple::as_select())
        .load(conn)?)
}

pub fn get(conn: &mut SqliteConnection, staple_id: i32) -> CoreResult<Option<Staple>> {
    Ok(staples::table
        .find(staple_id)
        .select(Staple::as_select())
        .first(conn)
        .optional()?)
}

pub fn get_by_name(conn: &mut SqliteConnection, name: &str) -> CoreResult<Option<Staple>> {
    Ok(staples::table
        .filter(lower(staples::name).eq(fold_name(name)))
        .select(Staple::as_select())
        .first(conn)
        .optional()?)
}

/// Insert a new staple. Names are unique case-insensitively; duplicates are
/// rejected with `AlreadyExists` before touching storage.
pub fn add(conn: &mut SqliteConnection, input: &StapleInput) -> CoreResult<i32> {
    let name = input.name.trim();
    if get_by_name(conn, name)?.is_some() {
        return Err(CoreError::AlreadyExists {
            kind: "staple",
            name: name.to_string(),
        });
    }

    let id = diesel::insert_into(staples::table)
        .values((
            staples::name.eq(name),
            staples::category.eq(input.category.as_deref()),
            staples::preferred_store_id.eq(input.preferred_store_id),
            staples::need_to_buy.eq(input.need_to_buy),
        ))
        .returning(staples::id)
        .get_result(conn)?;
    Ok(id)
}

pub fn update(conn: &mut SqliteConnection, staple_id: i32, input: &StapleInput) -> CoreResult<()> {
    diesel::update(staples::table.find(staple_id))
        .set((
            staples::name.eq(input.name.trim()),
            staples::category.eq(input.category.as_deref()),
            staples::preferred_store_id.eq(input.preferred_store_id),
            staples::need_to_buy.eq(input.need_to_buy),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn delete(conn: &mut SqliteConnection, staple_id: i32) -> CoreResult<()> {
    diesel::delete(staples::table.find(staple_id)).execute(conn)?;
    Ok(())
}

pub fn set_need_to_buy(conn: &mut SqliteConnection, staple_id: i32, need: bool) -> CoreResult<()> {
    diesel::update(staples::table.find(staple_id))
        .set(staples::need_to_buy.eq(need))
        .execute(conn)?;
    Ok(())
}

pub fn get_needed(conn: &mut SqliteConnection) -> CoreResult<Vec<Staple>> {
    Ok(staples::table
        .filter(staples::need_to_buy.eq(true))
        .order(staples::name.asc())
        .select(Staple::as_select())
        .load(conn)?)
}

/// One-time data transform: copy pantry rows flagged with the legacy
/// is_staple column into the staples table. Idempotent — rows whose name is
/// already a staple (case-insensitively) are skipped, so it is safe to run
/// repeatedly. Returns the number of staples created.
///
/// This is the only code path that reads the legacy flag.
pub fn migrate_legacy_pantry_staples(conn: &mut SqliteConnection) -> CoreResult<usize> {
    let legacy: Vec<(String, Option<String>, Option<i32>)> = pantry::table
        .filter(pantry::is_staple.eq(true))
        .select((pantry::name, pantry::category, pantry::preferred_store_id))
        .load(conn)?;

    let mut created = 0;
    for (name, category, preferred_store_id) in legacy {
        if get_by_name(conn, &name)?.is_some() {
            continue;
        }
        diesel::insert_into(staples::table)
            .values((
                staples::name.eq(name.trim()),
                staples::category.eq(category),
                staples::preferred_store_id.eq(preferred_store_id),
                staples::need_to_buy.eq(false),
            ))
            .execute(conn)?;
        created += 1;
    }
    if created > 0 {
        tracing::info!(created, "migrated legacy pantry staples");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn input(name: &str, need: bool) -> StapleInput {
        StapleInput {
            name: name.to_string(),
            category: None,
            preferred_store_id: None,
            need_to_buy: need,
        }
    }

    #[test]
    fn duplicate_guard_is_case_insensitive() {
        let mut conn = connect_in_memory();
        add(&mut conn, &input("Olive Oil", false)).unwrap();
        let err = add(&mut conn, &input("olive oil", false)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { kind: "staple", .. }));
    }

    #[test]
    fn need_to_buy_toggle() {
        let mut conn = connect_in_memory();
        let id = add(&mut conn, &input("salt", false)).unwrap();
        set_need_to_buy(&mut conn, id, true).unwrap();
        let needed = get_needed(&mut conn).unwrap();
        assert_eq!(needed.len(), 1);
        assert_eq!(needed[0].name, "salt");
    }

    #[test]
    fn legacy_migration_is_idempotent() {
        let mut conn = connect_in_memory();
        diesel::insert_into(pantry::table)
            .values((
                pantry::name.eq("Flour"),
                pantry::quantity.eq(1.0),
                pantry::is_staple.eq(true),
            ))
            .execute(&mut conn)
            .unwrap();
        // Already migrated under different casing: must be skipped.
        add(&mut conn, &input("Rice", false)).unwrap();
        diesel::insert_into(pantry::table)
            .values((
                pantry::name.eq("rice"),
                pantry::quantity.eq(1.0),
                pantry::is_staple.eq(true),
            ))
            .execute(&mut conn)
            .unwrap();

        assert_eq!(migrate_legacy_pantry_staples(&mut conn).unwrap(), 1);
        assert_eq!(migrate_legacy_pantry_staples(&mut conn).unwrap(), 0);

        let all = get_all(&mut conn).unwrap();
        assert_eq!(all.len(), 2);
        let flour = get_by_name(&mut conn, "flour").unwrap().unwrap();
        assert!(!flour.need_to_buy);
    }
}
