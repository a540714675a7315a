pub mod ai;
pub mod db;
pub mod error;
pub mod known_prices;
pub mod meal_plan;
pub mod models;
pub mod pantry;
pub mod recipes;
pub mod schema;
pub mod shopping_list;
pub mod staples;
pub mod stores;

pub use db::{create_pool, DbPool};
pub use error::{CoreError, CoreResult};
pub use models::{
    KnownPrice, MealPlanEntry, PantryItem, PlannedMeal, Recipe, RecipeIngredient,
    RecipeWithIngredients, Staple, Store,
};
pub use shopping_list::{ShoppingItem, ShoppingList};
