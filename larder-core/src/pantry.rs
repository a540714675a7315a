//! Pantry inventory — CRUD and PantryChecker CSV import.
//!
//! CSV rows are matched to existing items by barcode first, then by
//! name+brand. Store names appearing in CSV rows are auto-created.

use std::io::Read;

use chrono::{Local, NaiveDate};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::CoreResult;
use crate::models::{PantryItem, PantryItemInput};
use crate::schema::pantry;
use crate::stores;

/// What a CSV import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CsvImportSummary {
    pub inserted: usize,
    pub updated: usize,
}

pub fn get_all(
    conn: &mut SqliteConnection,
    location: Option<&str>,
    category: Option<&str>,
) -> CoreResult<Vec<PantryItem>> {
    let mut query = pantry::table
        .select(PantryItem::as_select())
        .into_boxed();
    if let Some(location) = location {
        query = query.filter(pantry::location.eq(location.to_string()));
    }
    if let Some(category) = category {
        query = query.filter(pantry::category.eq(category.to_string()));
    }
    Ok(query
        .order((pantry::category.asc(), pantry::name.asc()))
        .load(conn)?)
}

pub fn get(conn: &mut SqliteConnection, item_id: i32) -> CoreResult<Option<PantryItem>> {
    Ok(pantry::table
        .find(item_id)
        .select(PantryItem::as_select())
        .first(conn)
        .optional()?)
}

pub fn add(conn: &mut SqliteConnection, input: &PantryItemInput) -> CoreResult<i32> {
    let id = diesel::insert_into(pantry::table)
        .values(input)
        .returning(pantry::id)
        .get_result(conn)?;
    Ok(id)
}

pub fn update(conn: &mut SqliteConnection, item_id: i32, input: &PantryItemInput) -> CoreResult<()> {
    diesel::update(pantry::table.find(item_id))
        .set((
            pantry::barcode.eq(input.barcode.as_deref()),
            pantry::category.eq(input.category.as_deref()),
            pantry::location.eq(input.location.as_deref()),
            pantry::brand.eq(input.brand.as_deref()),
            pantry::name.eq(&input.name),
            pantry::quantity.eq(input.quantity),
            pantry::unit.eq(input.unit.as_deref()),
            pantry::stocked_date.eq(input.stocked_date),
            pantry::best_by.eq(input.best_by),
            pantry::preferred_store_id.eq(input.preferred_store_id),
            pantry::product_notes.eq(input.product_notes.as_deref()),
            pantry::item_notes.eq(input.item_notes.as_deref()),
            pantry::estimated_price.eq(input.estimated_price),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn delete(conn: &mut SqliteConnection, item_id: i32) -> CoreResult<()> {
    diesel::delete(pantry::table.find(item_id)).execute(conn)?;
    Ok(())
}

/// Delete multiple items at once. Returns the count deleted.
pub fn delete_many(conn: &mut SqliteConnection, item_ids: &[i32]) -> CoreResult<usize> {
    if item_ids.is_empty() {
        return Ok(0);
    }
    let deleted = diesel::delete(pantry::table.filter(pantry::id.eq_any(item_ids.iter().copied())))
        .execute(conn)?;
    Ok(deleted)
}

/// Items whose best_by date falls within the next `days` days.
pub fn get_expiring_soon(conn: &mut SqliteConnection, days: i64) -> CoreResult<Vec<PantryItem>> {
    let today = Local::now().date_naive();
    let cutoff = today + chrono::Duration::days(days);
    Ok(pantry::table
        .filter(pantry::best_by.is_not_null())
        .filter(pantry::best_by.le(cutoff))
        .filter(pantry::best_by.ge(today))
        .order(pantry::best_by.asc())
        .select(PantryItem::as_select())
        .load(conn)?)
}

pub fn get_locations(conn: &mut SqliteConnection) -> CoreResult<Vec<String>> {
    let rows: Vec<Option<String>> = pantry::table
        .filter(pantry::location.is_not_null())
        .select(pantry::location)
        .distinct()
        .order(pantry::location.asc())
        .load(conn)?;
    Ok(rows.into_iter().flatten().collect())
}

pub fn get_categories(conn: &mut SqliteConnection) -> CoreResult<Vec<String>> {
    let rows: Vec<Option<String>> = pantry::table
        .filter(pantry::category.is_not_null())
        .select(pantry::category)
        .distinct()
        .order(pantry::category.asc())
        .load(conn)?;
    Ok(rows.into_iter().flatten().collect())
}

/// Brief plain-text inventory summary for AI prompts.
pub fn summary(conn: &mut SqliteConnection) -> CoreResult<String> {
    let items = get_all(conn, None, None)?;
    if items.is_empty() {
        return Ok("Pantry is empty.".to_string());
    }

    let mut lines = Vec::with_capacity(items.len());
    for item in &items {
        let mut parts = vec![item.name.clone()];
        if let Some(brand) = &item.brand {
            parts.push(format!("({brand})"));
        }
        let mut qty = format!("{}", item.quantity);
        if let Some(unit) = &item.unit {
            qty.push(' ');
            qty.push_str(unit);
        }
        parts.push(format!("- qty: {qty}"));
        if let Some(location) = &item.location {
            parts.push(format!("[{location}]"));
        }
        lines.push(parts.join(" "));
    }
    Ok(lines.join("\n"))
}

/// Import a PantryChecker CSV export. Rows are upserted: matched by barcode
/// when present, then by name+brand. Unknown store names are created on the
/// fly. Returns (inserted, updated) counts.
pub fn import_csv<R: Read>(conn: &mut SqliteConnection, reader: R) -> CoreResult<CsvImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let idx_name = col("Name");
    let idx_barcode = col("Barcode");
    let idx_brand = col("Brand");
    let idx_quantity = col("Quantity");
    let idx_unit = col("Unit");
    let idx_category = col("Category");
    let idx_location = col("Location");
    let idx_stocked = col("Stocked");
    let idx_best_by = col("Best By");
    let idx_store = col("Store");
    let idx_product_notes = col("Product Notes");
    let idx_item_notes = col("Item Notes");

    let mut summary = CsvImportSummary::default();

    for record in rdr.records() {
        let record = record?;
        let field = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let Some(name) = field(idx_name) else {
            continue;
        };

        let store_id = stores::get_or_create(conn, field(idx_store).unwrap_or(""))?;

        let barcode = field(idx_barcode);
        let brand = field(idx_brand);

        let mut existing: Option<i32> = None;
        if let Some(code) = barcode {
            existing = pantry::table
                .filter(pantry::barcode.eq(code))
                .select(pantry::id)
                .first(conn)
                .optional()?;
        }
        if existing.is_none() {
            let mut query = pantry::table
                .filter(pantry::name.eq(name))
                .select(pantry::id)
                .into_boxed();
            query = match brand {
                Some(brand) => query.filter(
                    pantry::brand
                        .eq(brand.to_string())
                        .or(pantry::brand.is_null()),
                ),
                None => query.filter(pantry::brand.is_null()),
            };
            existing = query.first(conn).optional()?;
        }

        let quantity = field(idx_quantity)
            .and_then(|q| q.parse::<f64>().ok())
            .unwrap_or(1.0);
        let parse_date =
            |s: Option<&str>| s.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        let row = (
            pantry::barcode.eq(barcode),
            pantry::category.eq(field(idx_category)),
            pantry::location.eq(field(idx_location)),
            pantry::brand.eq(brand),
            pantry::name.eq(name),
            pantry::quantity.eq(quantity),
            pantry::unit.eq(field(idx_unit)),
            pantry::stocked_date.eq(parse_date(field(idx_stocked))),
            pantry::best_by.eq(parse_date(field(idx_best_by))),
            pantry::preferred_store_id.eq(store_id),
            pantry::product_notes.eq(field(idx_product_notes)),
            pantry::item_notes.eq(field(idx_item_notes)),
        );

        match existing {
            Some(id) => {
                diesel::update(pantry::table.find(id))
                    .set(row)
                    .execute(conn)?;
                summary.updated += 1;
            }
            None => {
                diesel::insert_into(pantry::table)
                    .values(row)
                    .execute(conn)?;
                summary.inserted += 1;
            }
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        updated = summary.updated,
        "pantry CSV import complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    const CSV: &str = "\
Name,Barcode,Brand,Quantity,Unit,Category,Location,Stocked,Best By,Store
Black Beans,0123,Goya,4,cans,Canned,Pantry,2026-07-01,2027-07-01,Safeway
Milk,,,1,gallon,Dairy,Fridge,,2026-08-10,Costco
";

    #[test]
    fn import_creates_items_and_stores() {
        let mut conn = connect_in_memory();
        let summary = import_csv(&mut conn, CSV.as_bytes()).unwrap();
        assert_eq!(summary, CsvImportSummary { inserted: 2, updated: 0 });

        let items = get_all(&mut conn, None, None).unwrap();
        assert_eq!(items.len(), 2);

        let stores = crate::stores::get_all(&mut conn).unwrap();
        let names: Vec<&str> = stores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Costco", "Safeway"]);
    }

    #[test]
    fn reimport_matches_by_barcode_then_name_brand() {
        let mut conn = connect_in_memory();
        import_csv(&mut conn, CSV.as_bytes()).unwrap();

        // Same barcode, changed quantity: updates in place.
        let update = "\
Name,Barcode,Brand,Quantity,Unit,Category,Location,Stocked,Best By,Store
Black Beans,0123,Goya,6,cans,Canned,Pantry,,,Safeway
Milk,,,2,gallon,Dairy,Fridge,,,Costco
";
        let summary = import_csv(&mut conn, update.as_bytes()).unwrap();
        assert_eq!(summary, CsvImportSummary { inserted: 0, updated: 2 });

        let items = get_all(&mut conn, None, None).unwrap();
        assert_eq!(items.len(), 2);
        let beans = items.iter().find(|i| i.name == "Black Beans").unwrap();
        assert_eq!(beans.quantity, 6.0);
    }

    #[test]
    fn filters_by_location() {
        let mut conn = connect_in_memory();
        import_csv(&mut conn, CSV.as_bytes()).unwrap();
        let fridge = get_all(&mut conn, Some("Fridge"), None).unwrap();
        assert_eq!(fridge.len(), 1);
        assert_eq!(fridge[0].name, "Milk");
    }

    #[test]
    fn summary_lists_items_or_reports_empty() {
        let mut conn = connect_in_memory();
        assert_eq!(summary(&mut conn).unwrap(), "Pantry is empty.");
        import_csv(&mut conn, CSV.as_bytes()).unwrap();
        let text = summary(&mut conn).unwrap();
        assert!(text.contains("Black Beans (Goya) - qty: 4 cans [Pantry]"));
    }
}
