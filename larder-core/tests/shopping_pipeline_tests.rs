//! End-to-end pipeline tests: normalize a saved recipe with a canned AI
//! response, persist the derived fields, plan meals, and generate the
//! shopping list.

use larder_core::ai::{normalize_ingredients, FakeProvider};
use larder_core::db::connect_in_memory;
use larder_core::models::{PantryItemInput, RecipeIngredientInput, RecipeInput, StapleInput};
use larder_core::{known_prices, meal_plan, pantry, recipes, shopping_list, staples};

use chrono::NaiveDate;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn chili() -> RecipeInput {
    RecipeInput {
        name: "Chili".to_string(),
        description: None,
        servings: 4,
        prep_time: None,
        cook_time: Some("45 minutes".to_string()),
        instructions: Some("Brown, simmer, serve.".to_string()),
        source_url: None,
        tags: Some("dinner,one-pot".to_string()),
        rating: Some(5),
        ingredients: vec![
            RecipeIngredientInput {
                name: "30oz black beans, drained".to_string(),
                quantity: Some(30.0),
                unit: Some("oz".to_string()),
                estimated_price: None,
                shopping_name: None,
                shopping_qty: None,
                shopping_unit: None,
            },
            RecipeIngredientInput {
                name: "Salt".to_string(),
                quantity: Some(1.0),
                unit: Some("tsp".to_string()),
                estimated_price: None,
                shopping_name: None,
                shopping_qty: None,
                shopping_unit: None,
            },
            RecipeIngredientInput {
                name: "ground beef".to_string(),
                quantity: Some(1.0),
                unit: Some("lbs".to_string()),
                estimated_price: Some(7.99),
                shopping_name: None,
                shopping_qty: None,
                shopping_unit: None,
            },
        ],
    }
}

const NORMALIZE_RESPONSE: &str = r#"```json
[
  {"index": 0, "shopping_name": "canned black beans", "shopping_qty": 2, "shopping_unit": "15oz cans"},
  {"index": 2, "shopping_name": "ground beef", "shopping_qty": 1, "shopping_unit": "lbs"}
]
```"#;

#[tokio::test]
async fn normalized_recipe_flows_into_shopping_list() {
    let mut conn = connect_in_memory();

    let recipe_id = recipes::add(&mut conn, &chili()).unwrap();
    let saved = recipes::get(&mut conn, recipe_id).unwrap().unwrap();

    let provider = FakeProvider::with_response("purchasable shopping form", NORMALIZE_RESPONSE);
    let results = normalize_ingredients(&provider, &saved.ingredients)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    // Index 1 was skipped by the model: falls back to raw fields downstream.
    assert_eq!(results[1], Default::default());

    recipes::apply_normalization(&mut conn, recipe_id, &results).unwrap();

    // Salt is a staple on hand, so it never reaches the list.
    staples::add(
        &mut conn,
        &StapleInput {
            name: "salt".to_string(),
            category: None,
            preferred_store_id: None,
            need_to_buy: false,
        },
    )
    .unwrap();

    // One can already in the pantry.
    pantry::add(
        &mut conn,
        &PantryItemInput {
            barcode: None,
            category: None,
            location: Some("Pantry".to_string()),
            brand: None,
            name: "canned black beans".to_string(),
            quantity: 1.0,
            unit: Some("cans".to_string()),
            stocked_date: None,
            best_by: None,
            preferred_store_id: None,
            product_notes: None,
            item_notes: None,
            estimated_price: None,
        },
    )
    .unwrap();

    // Receipt-sourced price outranks the recipe's own beef estimate.
    known_prices::upsert(
        &mut conn,
        &known_prices::PriceUpdate {
            item_name: "Ground Beef".to_string(),
            unit_price: 5.49,
            unit: Some("lbs".to_string()),
            store_id: None,
        },
    )
    .unwrap();

    meal_plan::set_meal(&mut conn, date("2026-03-02"), "Dinner", Some(recipe_id), 1, None).unwrap();

    let list =
        shopping_list::generate(&mut conn, date("2026-03-02"), date("2026-03-08"), true).unwrap();

    let items: Vec<_> = list.values().flatten().collect();
    assert_eq!(items.len(), 2);

    let beans = items
        .iter()
        .find(|i| i.name == "Canned Black Beans")
        .unwrap();
    assert_eq!(beans.quantity, Some(1.0));
    assert_eq!(beans.unit.as_deref(), Some("15oz cans"));

    let beef = items.iter().find(|i| i.name == "Ground Beef").unwrap();
    assert_eq!(beef.unit_price, Some(5.49));
    assert_eq!(beef.estimated_cost, Some(5.49));

    let text = shopping_list::format_shopping_list(&list);
    assert!(text.contains("[ ] Canned Black Beans"));
    assert!(text.contains("Estimated total:"));
}

#[tokio::test]
async fn failed_normalization_leaves_prior_fields_untouched() {
    let mut conn = connect_in_memory();
    let recipe_id = recipes::add(&mut conn, &chili()).unwrap();

    let provider = FakeProvider::with_response("purchasable shopping form", NORMALIZE_RESPONSE);
    let saved = recipes::get(&mut conn, recipe_id).unwrap().unwrap();
    let results = normalize_ingredients(&provider, &saved.ingredients)
        .await
        .unwrap();
    recipes::apply_normalization(&mut conn, recipe_id, &results).unwrap();

    // A later run returns garbage: the result is empty and nothing is
    // persisted over the earlier normalization.
    let bad_provider = FakeProvider::new().with_default_response("no json here");
    let bad_results = normalize_ingredients(&bad_provider, &saved.ingredients)
        .await
        .unwrap();
    assert!(bad_results.is_empty());
    recipes::apply_normalization(&mut conn, recipe_id, &bad_results).unwrap();

    let reloaded = recipes::get(&mut conn, recipe_id).unwrap().unwrap();
    assert_eq!(
        reloaded.ingredients[0].shopping_name.as_deref(),
        Some("canned black beans")
    );
}

#[test]
fn week_grid_covers_generated_range() {
    let mut conn = connect_in_memory();
    let recipe_id = recipes::add(&mut conn, &chili()).unwrap();

    let monday = meal_plan::week_start(Some(date("2026-03-05")));
    assert_eq!(monday, date("2026-03-02"));

    meal_plan::set_meal(&mut conn, monday, "Dinner", Some(recipe_id), 2, None).unwrap();

    let grid = meal_plan::get_week(&mut conn, monday).unwrap();
    let dinner = grid[0]
        .slots
        .iter()
        .find(|cell| cell.slot == "Dinner")
        .unwrap();
    let meal = dinner.meal.as_ref().unwrap();
    assert_eq!(meal.recipe_name.as_deref(), Some("Chili"));
    assert_eq!(meal.servings, 2);

    // The same range feeds the generator.
    let list = shopping_list::generate(&mut conn, monday, monday + chrono::Duration::days(6), false)
        .unwrap();
    assert!(!list.is_empty());
}
