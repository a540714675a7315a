//! Typed records for every entity, mapped field-by-field from the persisted
//! representation.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::stores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Insertable, Debug, Clone, Deserialize, ToSchema)]
#[diesel(table_name = crate::schema::stores)]
pub struct StoreInput {
    pub name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::pantry)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PantryItem {
    pub id: i32,
    pub barcode: Option<String>,
    pub category: Option<String>,
    /// Pantry, Fridge, or Freezer.
    pub location: Option<String>,
    pub brand: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub stocked_date: Option<NaiveDate>,
    pub best_by: Option<NaiveDate>,
    pub preferred_store_id: Option<i32>,
    pub product_notes: Option<String>,
    pub item_notes: Option<String>,
    pub estimated_price: Option<f64>,
    /// Legacy flag superseded by the staples table. Only the one-time
    /// migration utility reads it; everything else must ignore it.
    #[serde(skip)]
    pub is_staple: bool,
}

#[derive(Insertable, Debug, Clone, Deserialize, ToSchema)]
#[diesel(table_name = crate::schema::pantry)]
pub struct PantryItemInput {
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub brand: Option<String>,
    pub name: String,
    #[serde(default = "default_pantry_quantity")]
    pub quantity: f64,
    pub unit: Option<String>,
    pub stocked_date: Option<NaiveDate>,
    pub best_by: Option<NaiveDate>,
    pub preferred_store_id: Option<i32>,
    pub product_notes: Option<String>,
    pub item_notes: Option<String>,
    pub estimated_price: Option<f64>,
}

fn default_pantry_quantity() -> f64 {
    1.0
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub servings: i32,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    /// Comma-joined tag list, e.g. "chicken,quick,dinner".
    pub tags: Option<String>,
    pub created_at: NaiveDateTime,
    pub rating: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeIngredient {
    pub id: i32,
    pub recipe_id: i32,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub estimated_price: Option<f64>,
    /// Purchasable form derived by the normalizer; absent until a recipe has
    /// been normalized. Consumers fall back to the raw fields.
    pub shopping_name: Option<String>,
    pub shopping_qty: Option<f64>,
    pub shopping_unit: Option<String>,
}

/// A recipe together with its ordered ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
}

/// Unpersisted recipe shape shared by the create API and the AI parse and
/// generate paths.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecipeInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: i32,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    pub tags: Option<String>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientInput>,
}

fn default_servings() -> i32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecipeIngredientInput {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub estimated_price: Option<f64>,
    pub shopping_name: Option<String>,
    pub shopping_qty: Option<f64>,
    pub shopping_unit: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient<'a> {
    pub recipe_id: i32,
    pub name: &'a str,
    pub quantity: Option<f64>,
    pub unit: Option<&'a str>,
    pub estimated_price: Option<f64>,
    pub shopping_name: Option<&'a str>,
    pub shopping_qty: Option<f64>,
    pub shopping_unit: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::meal_plan)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MealPlanEntry {
    pub id: i32,
    pub date: NaiveDate,
    /// Breakfast, Lunch, Dinner, or Snack.
    pub meal_slot: String,
    pub recipe_id: Option<i32>,
    pub servings: i32,
    pub notes: Option<String>,
}

/// A meal plan entry with the recipe name joined in for display. The name is
/// never written back.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlannedMeal {
    pub id: i32,
    pub date: NaiveDate,
    pub meal_slot: String,
    pub recipe_id: Option<i32>,
    pub servings: i32,
    pub notes: Option<String>,
    pub recipe_name: Option<String>,
}

impl PlannedMeal {
    pub fn from_entry(entry: MealPlanEntry, recipe_name: Option<String>) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            meal_slot: entry.meal_slot,
            recipe_id: entry.recipe_id,
            servings: entry.servings,
            notes: entry.notes,
            recipe_name,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::meal_plan)]
pub struct NewMealPlanEntry<'a> {
    pub date: NaiveDate,
    pub meal_slot: &'a str,
    pub recipe_id: Option<i32>,
    pub servings: i32,
    pub notes: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::staples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Staple {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub preferred_store_id: Option<i32>,
    pub need_to_buy: bool,
}

#[derive(Insertable, Debug, Clone, Deserialize, ToSchema)]
#[diesel(table_name = crate::schema::staples)]
pub struct StapleInput {
    pub name: String,
    pub category: Option<String>,
    pub preferred_store_id: Option<i32>,
    #[serde(default)]
    pub need_to_buy: bool,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::known_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KnownPrice {
    pub id: i32,
    pub item_name: String,
    pub unit_price: f64,
    pub unit: Option<String>,
    pub store_id: Option<i32>,
    pub last_updated: NaiveDateTime,
}
