//! Weekly meal planning — assign recipes to date + meal-slot cells.
//!
//! The plan is stored sparsely: only cells with content have rows. Weeks
//! start on Monday and contain four slots per day; `get_week` always returns
//! the full 7 x 4 grid so a renderer can address every cell.

use chrono::{Datelike, Duration, Local, NaiveDate};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::CoreResult;
use crate::models::{MealPlanEntry, NewMealPlanEntry, PlannedMeal};
use crate::schema::{meal_plan, recipes};

pub const MEAL_SLOTS: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snack"];

/// One cell of the week grid; `meal` is None for empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SlotCell {
    pub slot: String,
    pub meal: Option<PlannedMeal>,
}

/// One day of the week grid with a cell for every slot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub slots: Vec<SlotCell>,
}

/// The Monday on or before `for_date` (today when omitted).
pub fn week_start(for_date: Option<NaiveDate>) -> NaiveDate {
    let date = for_date.unwrap_or_else(|| Local::now().date_naive());
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// All entries between `start` and `end` inclusive, recipe name joined in,
/// ordered by date then slot.
pub fn get_meals_in_range(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> CoreResult<Vec<PlannedMeal>> {
    let rows: Vec<(MealPlanEntry, Option<String>)> = meal_plan::table
        .left_join(recipes::table)
        .filter(meal_plan::date.ge(start))
        .filter(meal_plan::date.le(end))
        .order((meal_plan::date.asc(), meal_plan::meal_slot.asc()))
        .select((MealPlanEntry::as_select(), recipes::name.nullable()))
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(entry, recipe_name)| PlannedMeal::from_entry(entry, recipe_name))
        .collect())
}

/// The full week grid starting at `start`: 7 days, every slot present.
pub fn get_week(conn: &mut SqliteConnection, start: NaiveDate) -> CoreResult<Vec<DayPlan>> {
    let mut grid: Vec<DayPlan> = (0..7)
        .map(|offset| DayPlan {
            date: start + Duration::days(offset),
            slots: MEAL_SLOTS
                .iter()
                .map(|slot| SlotCell {
                    slot: (*slot).to_string(),
                    meal: None,
                })
                .collect(),
        })
        .collect();

    let meals = get_meals_in_range(conn, start, start + Duration::days(6))?;
    for meal in meals {
        if let Some(day) = grid.iter_mut().find(|day| day.date == meal.date) {
            if let Some(cell) = day.slots.iter_mut().find(|cell| cell.slot == meal.meal_slot) {
                cell.meal = Some(meal);
            }
        }
    }
    Ok(grid)
}

/// Insert, replace, or delete the entry for a (date, slot) cell.
///
/// An entry with no recipe but non-empty notes is kept as a manual meal
/// ("Leftovers", "Eat out"). No recipe and no notes deletes the cell.
pub fn set_meal(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    slot: &str,
    recipe_id: Option<i32>,
    servings: i32,
    notes: Option<&str>,
) -> CoreResult<()> {
    let existing: Option<i32> = meal_plan::table
        .filter(meal_plan::date.eq(date))
        .filter(meal_plan::meal_slot.eq(slot))
        .select(meal_plan::id)
        .first(conn)
        .optional()?;

    let has_content = recipe_id.is_some() || notes.is_some_and(|n| !n.trim().is_empty());

    match (existing, has_content) {
        (Some(id), true) => {
            diesel::update(meal_plan::table.find(id))
                .set((
                    meal_plan::recipe_id.eq(recipe_id),
                    meal_plan::servings.eq(servings),
                    meal_plan::notes.eq(notes),
                ))
                .execute(conn)?;
        }
        (Some(id), false) => {
            diesel::delete(meal_plan::table.find(id)).execute(conn)?;
        }
        (None, true) => {
            diesel::insert_into(meal_plan::table)
                .values(NewMealPlanEntry {
                    date,
                    meal_slot: slot,
                    recipe_id,
                    servings,
                    notes,
                })
                .execute(conn)?;
        }
        (None, false) => {}
    }
    Ok(())
}

/// Remove the assignment for a (date, slot) cell. Clearing an empty cell is
/// a no-op.
pub fn clear_meal(conn: &mut SqliteConnection, date: NaiveDate, slot: &str) -> CoreResult<()> {
    set_meal(conn, date, slot, None, 1, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::RecipeInput;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seed_recipe(conn: &mut SqliteConnection, name: &str) -> i32 {
        crate::recipes::add(
            conn,
            &RecipeInput {
                name: name.to_string(),
                description: None,
                servings: 4,
                prep_time: None,
                cook_time: None,
                instructions: None,
                source_url: None,
                tags: None,
                rating: None,
                ingredients: vec![],
            },
        )
        .unwrap()
    }

    #[test]
    fn week_start_aligns_to_monday() {
        // 2026-03-02 is a Monday.
        assert_eq!(week_start(Some(date("2026-03-02"))), date("2026-03-02"));
        assert_eq!(week_start(Some(date("2026-03-04"))), date("2026-03-02"));
        assert_eq!(week_start(Some(date("2026-03-08"))), date("2026-03-02"));
    }

    #[test]
    fn week_grid_has_every_cell() {
        let mut conn = connect_in_memory();
        let grid = get_week(&mut conn, date("2026-03-02")).unwrap();
        assert_eq!(grid.len(), 7);
        for day in &grid {
            assert_eq!(day.slots.len(), MEAL_SLOTS.len());
            assert!(day.slots.iter().all(|cell| cell.meal.is_none()));
        }
        assert_eq!(grid[0].date, date("2026-03-02"));
        assert_eq!(grid[6].date, date("2026-03-08"));
    }

    #[test]
    fn set_meal_replaces_existing_cell() {
        let mut conn = connect_in_memory();
        let soup = seed_recipe(&mut conn, "Soup");
        let tacos = seed_recipe(&mut conn, "Tacos");
        let monday = date("2026-03-02");

        set_meal(&mut conn, monday, "Dinner", Some(soup), 4, None).unwrap();
        set_meal(&mut conn, monday, "Dinner", Some(tacos), 2, Some("spicy")).unwrap();

        let meals = get_meals_in_range(&mut conn, monday, monday).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].recipe_id, Some(tacos));
        assert_eq!(meals[0].servings, 2);
        assert_eq!(meals[0].recipe_name.as_deref(), Some("Tacos"));
    }

    #[test]
    fn notes_only_entry_is_kept_as_manual_meal() {
        let mut conn = connect_in_memory();
        let monday = date("2026-03-02");
        set_meal(&mut conn, monday, "Lunch", None, 1, Some("Leftovers")).unwrap();

        let meals = get_meals_in_range(&mut conn, monday, monday).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].recipe_id, None);
        assert_eq!(meals[0].notes.as_deref(), Some("Leftovers"));
    }

    #[test]
    fn clear_meal_deletes_and_is_noop_when_empty() {
        let mut conn = connect_in_memory();
        let soup = seed_recipe(&mut conn, "Soup");
        let monday = date("2026-03-02");

        set_meal(&mut conn, monday, "Dinner", Some(soup), 4, None).unwrap();
        clear_meal(&mut conn, monday, "Dinner").unwrap();
        assert!(get_meals_in_range(&mut conn, monday, monday)
            .unwrap()
            .is_empty());

        // Clearing again must not error.
        clear_meal(&mut conn, monday, "Dinner").unwrap();
    }

    #[test]
    fn deleting_recipe_nulls_reference_but_keeps_row() {
        let mut conn = connect_in_memory();
        let soup = seed_recipe(&mut conn, "Soup");
        let monday = date("2026-03-02");
        set_meal(&mut conn, monday, "Dinner", Some(soup), 4, Some("double batch")).unwrap();

        crate::recipes::delete(&mut conn, soup).unwrap();

        let meals = get_meals_in_range(&mut conn, monday, monday).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].recipe_id, None);
        assert_eq!(meals[0].notes.as_deref(), Some("double batch"));
    }
}
