//! Shopping list generation — aggregate recipe ingredients across the
//! planned date range, subtract pantry stock, exclude staples, resolve
//! prices, group by store.
//!
//! `generate` is the main entry point. It reads the meal plan, recipes,
//! pantry, staples, and known prices, and writes nothing: calling it twice
//! with the same arguments and no intervening writes returns identical
//! results.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::fold_name;
use crate::error::CoreResult;
use crate::meal_plan;
use crate::models::{PantryItem, RecipeIngredient, Staple};
use crate::schema::{known_prices, pantry, recipe_ingredients, staples, stores};

/// Group label for lines with no preferred store on record.
pub const UNASSIGNED_STORE: &str = "No Store Assigned";

/// Group label for needed staples without a preferred store.
pub const STAPLES_STORE: &str = "Staples";

/// One line of the shopping list. Staple lines carry no quantity or unit:
/// a staple is a boolean "buy this", not an amount.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub estimated_cost: Option<f64>,
}

/// Store name mapped to its lines, sorted alphabetically within each group.
pub type ShoppingList = BTreeMap<String, Vec<ShoppingItem>>;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn first_non_empty<'a>(candidates: [Option<&'a str>; 2]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// The shopping-oriented (name, unit, quantity) triple for an ingredient:
/// normalized fields when present, raw fields otherwise.
fn effective_fields(ing: &RecipeIngredient) -> (String, String, f64) {
    let name = first_non_empty([ing.shopping_name.as_deref(), Some(ing.name.as_str())])
        .map(fold_name)
        .unwrap_or_default();
    let unit = first_non_empty([ing.shopping_unit.as_deref(), ing.unit.as_deref()])
        .map(fold_name)
        .unwrap_or_default();
    let qty = ing.shopping_qty.or(ing.quantity).unwrap_or(0.0);
    (name, unit, qty)
}

/// Ordered price sources, first hit wins: known price, then the recipe
/// ingredient's own estimate for this (name, unit), then the pantry estimate
/// for this name. No AI call happens here; estimation is a separate
/// user-triggered operation that fills the known_prices table ahead of time.
fn resolve_unit_price(
    name: &str,
    unit: &str,
    known: &HashMap<String, f64>,
    recipe_prices: &HashMap<(String, String), f64>,
    pantry_prices: &HashMap<String, f64>,
) -> Option<f64> {
    let sources: [&dyn Fn() -> Option<f64>; 3] = [
        &|| known.get(name).copied(),
        &|| recipe_prices.get(&(name.to_string(), unit.to_string())).copied(),
        &|| pantry_prices.get(name).copied(),
    ];
    sources.iter().find_map(|source| source())
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate the shopping list for `[start, end]` inclusive.
///
/// A start after the end is a valid empty request, not an error. When
/// `use_pantry` is set, on-hand pantry quantities are subtracted by name;
/// staples marked "I have it" are excluded either way.
pub fn generate(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
    use_pantry: bool,
) -> CoreResult<ShoppingList> {
    let entries = meal_plan::get_meals_in_range(conn, start, end)?;
    if entries.is_empty() {
        return Ok(ShoppingList::new());
    }

    // Aggregate required quantities across all planned meals,
    // keyed by (folded name, folded unit).
    let mut required: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut recipe_prices: HashMap<(String, String), f64> = HashMap::new();

    for entry in &entries {
        let Some(recipe_id) = entry.recipe_id else {
            continue;
        };
        let ingredients: Vec<RecipeIngredient> = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .order(recipe_ingredients::id.asc())
            .select(RecipeIngredient::as_select())
            .load(conn)?;

        for ing in &ingredients {
            let (name, unit, qty) = effective_fields(ing);
            let key = (name, unit);
            // The entry's servings count multiplies the stored quantities
            // directly; recipes are assumed already scaled to their base
            // servings.
            *required.entry(key.clone()).or_insert(0.0) += qty * f64::from(entry.servings);
            if let Some(price) = ing.estimated_price {
                recipe_prices.entry(key).or_insert(price);
            }
        }
    }

    if required.is_empty() {
        return Ok(ShoppingList::new());
    }

    let pantry_rows: Vec<PantryItem> = pantry::table
        .order(pantry::id.asc())
        .select(PantryItem::as_select())
        .load(conn)?;

    let mut pantry_qty: HashMap<String, f64> = HashMap::new();
    let mut pantry_prices: HashMap<String, f64> = HashMap::new();
    let mut pantry_store: HashMap<String, i32> = HashMap::new();
    for item in &pantry_rows {
        let folded = fold_name(&item.name);
        *pantry_qty.entry(folded.clone()).or_insert(0.0) += item.quantity;
        if let Some(price) = item.estimated_price {
            pantry_prices.entry(folded.clone()).or_insert(price);
        }
        if let Some(store_id) = item.preferred_store_id {
            pantry_store.entry(folded).or_insert(store_id);
        }
    }

    // Staples the user says they have are never bought, with or without
    // pantry subtraction.
    let have_staples: HashSet<String> = staples::table
        .filter(staples::need_to_buy.eq(false))
        .select(staples::name)
        .load::<String>(conn)?
        .into_iter()
        .map(|name| fold_name(&name))
        .collect();

    let known: HashMap<String, f64> = known_prices::table
        .select((known_prices::item_name, known_prices::unit_price))
        .load::<(String, f64)>(conn)?
        .into_iter()
        .map(|(name, price)| (fold_name(&name), price))
        .collect();

    let store_names: HashMap<i32, String> = stores::table
        .select((stores::id, stores::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let mut grouped = ShoppingList::new();

    for ((name, unit), needed) in &required {
        if have_staples.contains(name) {
            continue;
        }

        let buy_qty = if use_pantry {
            let on_hand = pantry_qty.get(name).copied().unwrap_or(0.0);
            let remaining = needed - on_hand;
            if remaining <= 0.0 {
                continue;
            }
            remaining
        } else {
            *needed
        };

        let unit_price = resolve_unit_price(name, unit, &known, &recipe_prices, &pantry_prices);
        let estimated_cost = unit_price.map(|price| round2(price * buy_qty));

        let store = pantry_store
            .get(name)
            .and_then(|id| store_names.get(id))
            .cloned()
            .unwrap_or_else(|| UNASSIGNED_STORE.to_string());

        grouped.entry(store).or_default().push(ShoppingItem {
            name: title_case(name),
            quantity: Some(round2(buy_qty)),
            unit: if unit.is_empty() {
                None
            } else {
                Some(unit.clone())
            },
            unit_price,
            estimated_cost,
        });
    }

    // Append staples the user marked as needed, unless a recipe already put
    // them on the list.
    let needed_staples: Vec<Staple> = staples::table
        .filter(staples::need_to_buy.eq(true))
        .order(staples::name.asc())
        .select(Staple::as_select())
        .load(conn)?;

    for staple in &needed_staples {
        let folded = fold_name(&staple.name);
        let already_listed = grouped
            .values()
            .flatten()
            .any(|item| fold_name(&item.name) == folded);
        if already_listed {
            continue;
        }

        let price = known.get(&folded).copied();
        let store = staple
            .preferred_store_id
            .and_then(|id| store_names.get(&id))
            .cloned()
            .unwrap_or_else(|| STAPLES_STORE.to_string());

        grouped.entry(store).or_default().push(ShoppingItem {
            name: staple.name.clone(),
            quantity: None,
            unit: None,
            unit_price: price,
            estimated_cost: price,
        });
    }

    for items in grouped.values_mut() {
        items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(grouped)
}

/// Which ingredient came from which planned meal: folded ingredient name
/// mapped to (recipe, date, slot, quantity, unit) provenance rows.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IngredientSource {
    pub recipe_id: i32,
    pub recipe_name: String,
    pub date: NaiveDate,
    pub meal_slot: String,
    pub quantity: f64,
    pub unit: String,
}

pub fn get_ingredient_sources(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> CoreResult<BTreeMap<String, Vec<IngredientSource>>> {
    let entries = meal_plan::get_meals_in_range(conn, start, end)?;
    let mut sources: BTreeMap<String, Vec<IngredientSource>> = BTreeMap::new();

    for entry in &entries {
        let Some(recipe_id) = entry.recipe_id else {
            continue;
        };
        let ingredients: Vec<RecipeIngredient> = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .order(recipe_ingredients::id.asc())
            .select(RecipeIngredient::as_select())
            .load(conn)?;

        for ing in &ingredients {
            let (name, unit, qty) = effective_fields(ing);
            sources.entry(name).or_default().push(IngredientSource {
                recipe_id,
                recipe_name: entry
                    .recipe_name
                    .clone()
                    .unwrap_or_else(|| "Unknown Recipe".to_string()),
                date: entry.date,
                meal_slot: entry.meal_slot.clone(),
                quantity: qty * f64::from(entry.servings),
                unit,
            });
        }
    }

    Ok(sources)
}

/// Render the grouped list as plain checklist text for export, with per-store
/// subtotals and a grand total when any line is priced.
pub fn format_shopping_list(list: &ShoppingList) -> String {
    if list.is_empty() {
        return "No items needed.".to_string();
    }

    let mut lines = Vec::new();
    let mut grand_total = 0.0;
    let mut any_priced = false;

    for (store, items) in list {
        lines.push(format!("=== {store} ==="));
        let mut subtotal = 0.0;
        let mut store_priced = false;

        for item in items {
            let mut line = format!("  [ ] {}", item.name);
            if let Some(qty) = item.quantity {
                if qty > 0.0 {
                    let unit = item.unit.as_deref().unwrap_or("");
                    line.push_str(&format!(" — {}", format!("{qty} {unit}").trim_end()));
                }
            }
            if let Some(cost) = item.estimated_cost {
                line.push_str(&format!("  ${cost:.2}"));
                subtotal += cost;
                store_priced = true;
            }
            lines.push(line);
        }

        if store_priced {
            lines.push(format!("  Store subtotal: ${subtotal:.2}"));
            grand_total += subtotal;
            any_priced = true;
        }
        lines.push(String::new());
    }

    if any_priced {
        lines.push(format!("Estimated total: ${grand_total:.2}"));
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::known_prices::{self, PriceUpdate};
    use crate::models::{PantryItemInput, RecipeIngredientInput, RecipeInput, StapleInput};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ingredient(name: &str, qty: Option<f64>, unit: Option<&str>) -> RecipeIngredientInput {
        RecipeIngredientInput {
            name: name.to_string(),
            quantity: qty,
            unit: unit.map(str::to_string),
            estimated_price: None,
            shopping_name: None,
            shopping_qty: None,
            shopping_unit: None,
        }
    }

    fn recipe(name: &str, ingredients: Vec<RecipeIngredientInput>) -> RecipeInput {
        RecipeInput {
            name: name.to_string(),
            description: None,
            servings: 4,
            prep_time: None,
            cook_time: None,
            instructions: None,
            source_url: None,
            tags: None,
            rating: None,
            ingredients,
        }
    }

    fn pantry_item(name: &str, qty: f64, price: Option<f64>) -> PantryItemInput {
        PantryItemInput {
            barcode: None,
            category: None,
            location: None,
            brand: None,
            name: name.to_string(),
            quantity: qty,
            unit: None,
            stocked_date: None,
            best_by: None,
            preferred_store_id: None,
            product_notes: None,
            item_notes: None,
            estimated_price: price,
        }
    }

    fn all_items(list: &ShoppingList) -> Vec<&ShoppingItem> {
        list.values().flatten().collect()
    }

    /// Scenario A: raw quantity is multiplied by the entry servings directly.
    #[test]
    fn raw_quantity_times_entry_servings() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("carrot", Some(2.0), Some("cups"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 8, None).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-08"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Carrot");
        assert_eq!(items[0].quantity, Some(16.0));
        assert_eq!(items[0].unit.as_deref(), Some("cups"));
    }

    /// Derived shopping fields win over raw fields regardless of the raw
    /// quantity value.
    #[test]
    fn shopping_fields_take_precedence() {
        let mut conn = connect_in_memory();
        let mut chili = recipe(
            "Chili",
            vec![ingredient("30oz black beans, drained", Some(30.0), Some("oz"))],
        );
        chili.ingredients[0].shopping_name = Some("canned black beans".to_string());
        chili.ingredients[0].shopping_qty = Some(2.0);
        chili.ingredients[0].shopping_unit = Some("15oz cans".to_string());
        let id = crate::recipes::add(&mut conn, &chili).unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(id), 1, None).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Canned Black Beans");
        assert_eq!(items[0].quantity, Some(2.0));
        assert_eq!(items[0].unit.as_deref(), Some("15oz cans"));
    }

    /// Scenario B: pantry stock is subtracted only when use_pantry is set.
    #[test]
    fn pantry_subtraction_toggle() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("carrot", Some(2.0), Some("cups"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 8, None).unwrap();
        crate::pantry::add(&mut conn, &pantry_item("carrot", 10.0, None)).unwrap();

        let with_pantry =
            generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        assert_eq!(all_items(&with_pantry)[0].quantity, Some(6.0));

        let without_pantry =
            generate(&mut conn, date("2026-03-02"), date("2026-03-02"), false).unwrap();
        assert_eq!(all_items(&without_pantry)[0].quantity, Some(16.0));
    }

    /// Fully covered lines drop off the list entirely.
    #[test]
    fn covered_lines_are_dropped() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("carrot", Some(2.0), Some("cups"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 1, None).unwrap();
        crate::pantry::add(&mut conn, &pantry_item("Carrot", 5.0, None)).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        assert!(list.is_empty());
    }

    /// Scenario C: a staple marked "I have it" never appears, regardless of
    /// use_pantry and pantry stock.
    #[test]
    fn staple_exclusion_is_unconditional() {
        let mut conn = connect_in_memory();
        let bread = crate::recipes::add(
            &mut conn,
            &recipe("Bread", vec![ingredient("Salt", Some(1.0), Some("tsp"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(bread), 4, None).unwrap();
        crate::staples::add(
            &mut conn,
            &StapleInput {
                name: "salt".to_string(),
                category: None,
                preferred_store_id: None,
                need_to_buy: false,
            },
        )
        .unwrap();

        for use_pantry in [true, false] {
            let list =
                generate(&mut conn, date("2026-03-02"), date("2026-03-02"), use_pantry).unwrap();
            assert!(list.is_empty(), "use_pantry={use_pantry}");
        }
    }

    /// Scenario D: the same (name, unit) from different recipes merges.
    #[test]
    fn aggregates_across_recipes() {
        let mut conn = connect_in_memory();
        let stew = crate::recipes::add(
            &mut conn,
            &recipe("Stew", vec![ingredient("onion", Some(1.0), Some("each"))]),
        )
        .unwrap();
        let curry = crate::recipes::add(
            &mut conn,
            &recipe("Curry", vec![ingredient("Onion", Some(2.0), Some("each"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(stew), 1, None).unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-03"), "Dinner", Some(curry), 1, None).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-03"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Onion");
        assert_eq!(items[0].quantity, Some(3.0));
    }

    /// Names differing only in case and whitespace are the same line.
    #[test]
    fn name_matching_is_case_and_whitespace_insensitive() {
        let mut conn = connect_in_memory();
        let a = crate::recipes::add(
            &mut conn,
            &recipe("A", vec![ingredient("Black Beans", Some(1.0), Some("cans"))]),
        )
        .unwrap();
        let b = crate::recipes::add(
            &mut conn,
            &recipe("B", vec![ingredient(" black beans ", Some(2.0), Some("cans"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Lunch", Some(a), 1, None).unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(b), 1, None).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Some(3.0));
    }

    /// Known price beats the recipe estimate, which beats the pantry
    /// estimate.
    #[test]
    fn price_resolution_priority() {
        let mut conn = connect_in_memory();
        let mut taco = recipe("Tacos", vec![ingredient("beef", Some(1.0), Some("lbs"))]);
        taco.ingredients[0].estimated_price = Some(7.99);
        let id = crate::recipes::add(&mut conn, &taco).unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(id), 2, None).unwrap();
        crate::pantry::add(&mut conn, &pantry_item("beef", 0.0, Some(6.49))).unwrap();
        known_prices::upsert(
            &mut conn,
            &PriceUpdate {
                item_name: "Beef".to_string(),
                unit_price: 5.99,
                unit: None,
                store_id: None,
            },
        )
        .unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items[0].unit_price, Some(5.99));
        assert_eq!(items[0].estimated_cost, Some(round2(5.99 * 2.0)));

        // Remove the known price: the recipe estimate is next.
        let known = known_prices::get_all(&mut conn).unwrap();
        known_prices::delete(&mut conn, known[0].id).unwrap();
        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        assert_eq!(all_items(&list)[0].unit_price, Some(7.99));
    }

    /// start > end is a valid empty request.
    #[test]
    fn inverted_range_is_empty_not_error() {
        let mut conn = connect_in_memory();
        let list = generate(&mut conn, date("2026-03-08"), date("2026-03-02"), true).unwrap();
        assert!(list.is_empty());
    }

    /// Two identical calls with no intervening writes return identical
    /// results.
    #[test]
    fn generate_is_idempotent() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("carrot", Some(2.0), Some("cups"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 3, None).unwrap();
        crate::pantry::add(&mut conn, &pantry_item("carrot", 1.0, Some(0.89))).unwrap();

        let first = generate(&mut conn, date("2026-03-02"), date("2026-03-08"), true).unwrap();
        let second = generate(&mut conn, date("2026-03-02"), date("2026-03-08"), true).unwrap();
        assert_eq!(first, second);
    }

    /// Needed staples are appended as quantity-less lines under their
    /// preferred store, or the fallback group.
    #[test]
    fn needed_staples_append_without_quantity() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("carrot", Some(1.0), None)]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 1, None).unwrap();
        crate::staples::add(
            &mut conn,
            &StapleInput {
                name: "Coffee".to_string(),
                category: None,
                preferred_store_id: None,
                need_to_buy: true,
            },
        )
        .unwrap();
        known_prices::upsert(
            &mut conn,
            &PriceUpdate {
                item_name: "coffee".to_string(),
                unit_price: 11.99,
                unit: None,
                store_id: None,
            },
        )
        .unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let staples_group = list.get(STAPLES_STORE).unwrap();
        assert_eq!(staples_group.len(), 1);
        assert_eq!(staples_group[0].name, "Coffee");
        assert_eq!(staples_group[0].quantity, None);
        assert_eq!(staples_group[0].unit, None);
        assert_eq!(staples_group[0].unit_price, Some(11.99));
    }

    /// A needed staple already covered by a recipe line is not duplicated.
    #[test]
    fn needed_staple_already_listed_is_skipped() {
        let mut conn = connect_in_memory();
        let soup = crate::recipes::add(
            &mut conn,
            &recipe("Soup", vec![ingredient("coffee", Some(1.0), Some("bags"))]),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(soup), 1, None).unwrap();
        crate::staples::add(
            &mut conn,
            &StapleInput {
                name: "Coffee".to_string(),
                category: None,
                preferred_store_id: None,
                need_to_buy: true,
            },
        )
        .unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Some(1.0));
    }

    /// Lines land in the preferred store group of the matching pantry item.
    #[test]
    fn lines_group_by_pantry_preferred_store() {
        let mut conn = connect_in_memory();
        let store_id = crate::stores::get_or_create(&mut conn, "Safeway")
            .unwrap()
            .unwrap();
        let mut item = pantry_item("milk", 0.0, None);
        item.preferred_store_id = Some(store_id);
        crate::pantry::add(&mut conn, &item).unwrap();

        let cereal = crate::recipes::add(
            &mut conn,
            &recipe(
                "Cereal",
                vec![
                    ingredient("milk", Some(1.0), Some("gallon")),
                    ingredient("oats", Some(1.0), Some("lbs")),
                ],
            ),
        )
        .unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Breakfast", Some(cereal), 1, None)
            .unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        assert_eq!(list.get("Safeway").unwrap()[0].name, "Milk");
        assert_eq!(list.get(UNASSIGNED_STORE).unwrap()[0].name, "Oats");
    }

    #[test]
    fn format_renders_checklist_with_totals() {
        let mut list = ShoppingList::new();
        list.insert(
            "Safeway".to_string(),
            vec![
                ShoppingItem {
                    name: "Carrot".to_string(),
                    quantity: Some(6.0),
                    unit: Some("cups".to_string()),
                    unit_price: Some(0.5),
                    estimated_cost: Some(3.0),
                },
                ShoppingItem {
                    name: "Coffee".to_string(),
                    quantity: None,
                    unit: None,
                    unit_price: None,
                    estimated_cost: None,
                },
            ],
        );

        let text = format_shopping_list(&list);
        assert!(text.contains("=== Safeway ==="));
        assert!(text.contains("[ ] Carrot — 6 cups  $3.00"));
        assert!(text.contains("[ ] Coffee"));
        assert!(text.contains("Store subtotal: $3.00"));
        assert!(text.contains("Estimated total: $3.00"));
    }

    #[test]
    fn format_empty_list() {
        assert_eq!(format_shopping_list(&ShoppingList::new()), "No items needed.");
    }

    /// Scenario E: an ingredient the normalizer skipped falls back to raw
    /// fields end to end.
    #[test]
    fn partial_normalization_falls_back_per_ingredient() {
        let mut conn = connect_in_memory();
        let mut chili = recipe(
            "Chili",
            vec![
                ingredient("30oz black beans, drained", Some(30.0), Some("oz")),
                ingredient("cumin", Some(1.0), Some("tsp")),
            ],
        );
        chili.ingredients[0].shopping_name = Some("canned black beans".to_string());
        chili.ingredients[0].shopping_qty = Some(2.0);
        chili.ingredients[0].shopping_unit = Some("15oz cans".to_string());
        let id = crate::recipes::add(&mut conn, &chili).unwrap();
        meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(id), 1, None).unwrap();

        let list = generate(&mut conn, date("2026-03-02"), date("2026-03-02"), true).unwrap();
        let items = all_items(&list);
        assert_eq!(items.len(), 2);
        let cumin = items.iter().find(|i| i.name == "Cumin").unwrap();
        assert_eq!(cumin.quantity, Some(1.0));
        assert_eq!(cumin.unit.as_deref(), Some("tsp"));
        let beans = items.iter().find(|i| i.name == "Canned Black Beans").unwrap();
        assert_eq!(beans.quantity, Some(2.0));
    }
}
