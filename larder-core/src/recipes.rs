//! Recipe library — CRUD plus normalization persistence.
//!
//! Each recipe owns an ordered ingredient list. Updating a recipe replaces
//! all of its ingredients; deleting one cascade-deletes them.

use diesel::prelude::*;

use crate::ai::NormalizationResult;
use crate::error::CoreResult;
use crate::models::{
    NewRecipeIngredient, Recipe, RecipeIngredient, RecipeInput, RecipeWithIngredients,
};
use crate::schema::{recipe_ingredients, recipes};

fn load_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> CoreResult<Vec<RecipeIngredient>> {
    Ok(recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq(recipe_id))
        .order(recipe_ingredients::id.asc())
        .select(RecipeIngredient::as_select())
        .load(conn)?)
}

fn with_ingredients(
    conn: &mut SqliteConnection,
    recipe: Recipe,
) -> CoreResult<RecipeWithIngredients> {
    let ingredients = load_ingredients(conn, recipe.id)?;
    Ok(RecipeWithIngredients {
        recipe,
        ingredients,
    })
}

pub fn get_all(conn: &mut SqliteConnection) -> CoreResult<Vec<RecipeWithIngredients>> {
    let rows: Vec<Recipe> = recipes::table
        .order(recipes::name.asc())
        .select(Recipe::as_select())
        .load(conn)?;
    rows.into_iter()
        .map(|recipe| with_ingredients(conn, recipe))
        .collect()
}

pub fn get(conn: &mut SqliteConnection, recipe_id: i32) -> CoreResult<Option<RecipeWithIngredients>> {
    let row: Option<Recipe> = recipes::table
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(recipe) => Ok(Some(with_ingredients(conn, recipe)?)),
        None => Ok(None),
    }
}

/// Recipes whose name, description, or tags match the query,
/// case-insensitively.
pub fn search(conn: &mut SqliteConnection, query: &str) -> CoreResult<Vec<RecipeWithIngredients>> {
    let pattern = format!("%{}%", query.trim());
    let rows: Vec<Recipe> = recipes::table
        .filter(
            recipes::name
                .like(pattern.clone())
                .or(recipes::description.like(pattern.clone()))
                .or(recipes::tags.like(pattern)),
        )
        .order(recipes::name.asc())
        .select(Recipe::as_select())
        .load(conn)?;
    rows.into_iter()
        .map(|recipe| with_ingredients(conn, recipe))
        .collect()
}

fn insert_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    input: &RecipeInput,
) -> Result<(), diesel::result::Error> {
    for ing in &input.ingredients {
        diesel::insert_into(recipe_ingredients::table)
            .values(NewRecipeIngredient {
                recipe_id,
                name: &ing.name,
                quantity: ing.quantity,
                unit: ing.unit.as_deref(),
                estimated_price: ing.estimated_price,
                shopping_name: ing.shopping_name.as_deref(),
                shopping_qty: ing.shopping_qty,
                shopping_unit: ing.shopping_unit.as_deref(),
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Insert a recipe and its ingredients. Returns the new recipe id.
pub fn add(conn: &mut SqliteConnection, input: &RecipeInput) -> CoreResult<i32> {
    let recipe_id = conn.transaction(|conn| {
        let recipe_id: i32 = diesel::insert_into(recipes::table)
            .values((
                recipes::name.eq(&input.name),
                recipes::description.eq(input.description.as_deref()),
                recipes::servings.eq(input.servings),
                recipes::prep_time.eq(input.prep_time.as_deref()),
                recipes::cook_time.eq(input.cook_time.as_deref()),
                recipes::instructions.eq(input.instructions.as_deref()),
                recipes::source_url.eq(input.source_url.as_deref()),
                recipes::tags.eq(input.tags.as_deref()),
                recipes::rating.eq(input.rating),
            ))
            .returning(recipes::id)
            .get_result(conn)?;
        insert_ingredients(conn, recipe_id, input)?;
        Ok::<_, diesel::result::Error>(recipe_id)
    })?;
    Ok(recipe_id)
}

/// Update a recipe's fields and replace all of its ingredients.
pub fn update(conn: &mut SqliteConnection, recipe_id: i32, input: &RecipeInput) -> CoreResult<()> {
    conn.transaction(|conn| {
        diesel::update(recipes::table.find(recipe_id))
            .set((
                recipes::name.eq(&input.name),
                recipes::description.eq(input.description.as_deref()),
                recipes::servings.eq(input.servings),
                recipes::prep_time.eq(input.prep_time.as_deref()),
                recipes::cook_time.eq(input.cook_time.as_deref()),
                recipes::instructions.eq(input.instructions.as_deref()),
                recipes::source_url.eq(input.source_url.as_deref()),
                recipes::tags.eq(input.tags.as_deref()),
                recipes::rating.eq(input.rating),
            ))
            .execute(conn)?;
        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?;
        insert_ingredients(conn, recipe_id, input)
    })?;
    Ok(())
}

/// Delete a recipe. Ingredients are cascade-deleted by the database.
pub fn delete(conn: &mut SqliteConnection, recipe_id: i32) -> CoreResult<()> {
    diesel::delete(recipes::table.find(recipe_id)).execute(conn)?;
    Ok(())
}

/// Recipes that still have ingredients without normalized shopping fields.
pub fn get_unnormalized(conn: &mut SqliteConnection) -> CoreResult<Vec<RecipeWithIngredients>> {
    let ids: Vec<i32> = recipe_ingredients::table
        .filter(recipe_ingredients::shopping_name.is_null())
        .select(recipe_ingredients::recipe_id)
        .distinct()
        .load(conn)?;

    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(recipe) = get(conn, id)? {
            result.push(recipe);
        }
    }
    Ok(result)
}

/// Persist normalization results onto a recipe's ingredients, matched by
/// position against the ordered ingredient list. Entries with no derived
/// fields at all are skipped so a null response never erases earlier
/// normalization. Returns the number of ingredients updated.
pub fn apply_normalization(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    results: &[NormalizationResult],
) -> CoreResult<usize> {
    let ingredients = load_ingredients(conn, recipe_id)?;

    let mut updated = 0;
    for (ingredient, result) in ingredients.iter().zip(results) {
        if result.shopping_name.is_none()
            && result.shopping_qty.is_none()
            && result.shopping_unit.is_none()
        {
            continue;
        }
        diesel::update(recipe_ingredients::table.find(ingredient.id))
            .set((
                recipe_ingredients::shopping_name.eq(result.shopping_name.as_deref()),
                recipe_ingredients::shopping_qty.eq(result.shopping_qty),
                recipe_ingredients::shopping_unit.eq(result.shopping_unit.as_deref()),
            ))
            .execute(conn)?;
        updated += 1;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::RecipeIngredientInput;

    fn soup() -> RecipeInput {
        RecipeInput {
            name: "Soup".to_string(),
            description: Some("Weeknight soup".to_string()),
            servings: 4,
            prep_time: None,
            cook_time: Some("30 minutes".to_string()),
            instructions: Some("Simmer everything.".to_string()),
            source_url: None,
            tags: Some("soup,quick".to_string()),
            rating: Some(4),
            ingredients: vec![
                RecipeIngredientInput {
                    name: "carrot".to_string(),
                    quantity: Some(2.0),
                    unit: Some("cups".to_string()),
                    estimated_price: None,
                    shopping_name: None,
                    shopping_qty: None,
                    shopping_unit: None,
                },
                RecipeIngredientInput {
                    name: "30oz black beans, drained".to_string(),
                    quantity: Some(30.0),
                    unit: Some("oz".to_string()),
                    estimated_price: Some(1.29),
                    shopping_name: None,
                    shopping_qty: None,
                    shopping_unit: None,
                },
            ],
        }
    }

    #[test]
    fn add_and_get_round_trip() {
        let mut conn = connect_in_memory();
        let id = add(&mut conn, &soup()).unwrap();
        let loaded = get(&mut conn, id).unwrap().unwrap();
        assert_eq!(loaded.recipe.name, "Soup");
        assert_eq!(loaded.ingredients.len(), 2);
        assert_eq!(loaded.ingredients[0].name, "carrot");
    }

    #[test]
    fn update_replaces_ingredients() {
        let mut conn = connect_in_memory();
        let id = add(&mut conn, &soup()).unwrap();

        let mut changed = soup();
        changed.ingredients.truncate(1);
        changed.ingredients[0].name = "parsnip".to_string();
        update(&mut conn, id, &changed).unwrap();

        let loaded = get(&mut conn, id).unwrap().unwrap();
        assert_eq!(loaded.ingredients.len(), 1);
        assert_eq!(loaded.ingredients[0].name, "parsnip");
    }

    #[test]
    fn delete_cascades_to_ingredients() {
        let mut conn = connect_in_memory();
        let id = add(&mut conn, &soup()).unwrap();
        delete(&mut conn, id).unwrap();

        let orphans: i64 = recipe_ingredients::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn search_matches_tags() {
        let mut conn = connect_in_memory();
        add(&mut conn, &soup()).unwrap();
        assert_eq!(search(&mut conn, "QUICK").unwrap().len(), 1);
        assert!(search(&mut conn, "dessert").unwrap().is_empty());
    }

    #[test]
    fn apply_normalization_skips_null_entries() {
        let mut conn = connect_in_memory();
        let id = add(&mut conn, &soup()).unwrap();

        let results = vec![
            NormalizationResult::default(),
            NormalizationResult {
                shopping_name: Some("canned black beans".to_string()),
                shopping_qty: Some(2.0),
                shopping_unit: Some("15oz cans".to_string()),
            },
        ];
        assert_eq!(apply_normalization(&mut conn, id, &results).unwrap(), 1);

        let loaded = get(&mut conn, id).unwrap().unwrap();
        assert_eq!(loaded.ingredients[0].shopping_name, None);
        assert_eq!(
            loaded.ingredients[1].shopping_name.as_deref(),
            Some("canned black beans")
        );

        // Unnormalized listing still reports the recipe: the carrot line has
        // no shopping fields.
        assert_eq!(get_unnormalized(&mut conn).unwrap().len(), 1);
    }
}
