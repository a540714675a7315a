//! Prompt construction for the assistant operations.
//!
//! Every prompt asks for a single JSON document inside ```json fences; the
//! assistant layer extracts and parses that block and treats anything else
//! as a failed response.

/// JSON schema template included in recipe-producing prompts.
pub const RECIPE_SCHEMA: &str = r#"
{
  "name": "Recipe Name",
  "description": "Brief description",
  "servings": 4,
  "prep_time": "15 minutes",
  "cook_time": "30 minutes",
  "tags": "chicken,quick,dinner",
  "rating": 4,
  "instructions": "Step 1...\nStep 2...",
  "ingredients": [
    {"name": "chicken breast", "quantity": 2, "unit": "lbs"},
    {"name": "garlic", "quantity": 3, "unit": "cloves"}
  ]
}
"#;

pub fn parse_recipe_text(text: &str) -> String {
    format!(
        "Extract the recipe from the following text and return it as JSON matching this schema exactly:\n\
         {RECIPE_SCHEMA}\n\
         Recipe text:\n{text}\n\n\
         Return only the JSON, wrapped in ```json``` code fences."
    )
}

pub fn parse_recipe_page(url: &str, page_text: &str) -> String {
    format!(
        "Extract the recipe from the following web page content and return it as JSON matching this schema exactly:\n\
         {RECIPE_SCHEMA}\n\
         Also include \"source_url\": \"{url}\" in the JSON.\n\n\
         Page content:\n{page_text}\n\n\
         Return only the JSON, wrapped in ```json``` code fences."
    )
}

pub fn generate_recipe(pantry_summary: &str, preferences: &str) -> String {
    let extra = if preferences.is_empty() {
        String::new()
    } else {
        format!("\n\nAdditional preferences or constraints: {preferences}")
    };
    format!(
        "I have the following items in my pantry/fridge/freezer:\n\n\
         {pantry_summary}\n\n\
         Please create a recipe I can make using primarily these ingredients. \
         Return it as JSON matching this schema exactly:\n\
         {RECIPE_SCHEMA}{extra}\n\n\
         Return only the JSON, wrapped in ```json``` code fences."
    )
}

pub fn suggest_week(pantry_summary: &str, recipes: &str, preferences: &str) -> String {
    let extra = if preferences.is_empty() {
        String::new()
    } else {
        format!("\n\nPreferences/constraints: {preferences}")
    };
    format!(
        "Help me plan a week of meals (Monday through Sunday, with Breakfast, Lunch, and Dinner each day).\n\n\
         My pantry/fridge/freezer contains:\n{pantry_summary}\n\n\
         My saved recipes include:\n{recipes}\n\n\
         Prefer recipes with higher ratings (4-5 stars). Consider tags when planning: use 'breakfast' \
         tagged recipes for breakfast slots, respect dietary tags like 'vegetarian', 'gluten-free', etc.\n\n\
         You can suggest meals from my saved recipes, simple meals using pantry items, or new recipe ideas.\n\
         Return a JSON array like this:\n\
         ```json\n\
         [\n\
           {{\"day\": \"Monday\", \"slot\": \"Breakfast\", \"meal\": \"Oatmeal with fruit\", \"notes\": \"Use pantry oats\"}},\n\
           {{\"day\": \"Monday\", \"slot\": \"Lunch\", \"meal\": \"...\", \"notes\": \"...\"}}\n\
         ]\n\
         ```{extra}\n\n\
         Return only the JSON array, wrapped in ```json``` code fences."
    )
}

pub fn normalize_ingredients(ingredient_lines: &str) -> String {
    format!(
        "Convert these recipe ingredients into their purchasable shopping form.\n\n\
         For each ingredient:\n\
         1. Strip preparation instructions (drained, minced, divided, chopped, room temperature, etc.)\n\
         2. Convert to how the item is purchased (e.g. \"30oz black beans drained\" -> \"canned black beans\", qty 2, unit \"15oz cans\")\n\
         3. Keep qualifiers that affect what you buy: canned, dry, fresh, frozen, whole, ground, etc.\n\
         4. Use common grocery units: lbs, oz, each, bunch, cans, bags, bottles, etc.\n\
         5. Normalize the name to a common grocery name (e.g. \"garlic cloves\" -> \"garlic\")\n\n\
         Recipe ingredients:\n{ingredient_lines}\n\n\
         Return a JSON array with one entry per ingredient (same order), matching this schema:\n\
         ```json\n\
         [\n\
           {{\"index\": 0, \"shopping_name\": \"chicken breast\", \"shopping_qty\": 2, \"shopping_unit\": \"lbs\"}},\n\
           {{\"index\": 1, \"shopping_name\": \"garlic\", \"shopping_qty\": 1, \"shopping_unit\": \"head\"}}\n\
         ]\n\
         ```\n\n\
         Return only the JSON array, wrapped in ```json``` code fences."
    )
}

pub fn estimate_prices(items_template: &str) -> String {
    format!(
        "Estimate current US grocery store prices for these ingredients.\n\
         Return a JSON object with EXACTLY these keys and a numeric price value for each.\n\n\
         Fill in this template:\n\
         ```json\n\
         {{\n{items_template}\n}}\n\
         ```\n\n\
         Prices should be per the unit shown (e.g. per lb, per cup, per clove).\n\
         Replace each <price...> with a realistic number. Return only the filled-in JSON in ```json``` code fences."
    )
}

pub const PARSE_RECEIPT: &str = "\
Extract all grocery items and their prices from this receipt.

For each item, provide:
- item_name: the product name (simplified to a common grocery name, e.g. \"BLK BEANS 15OZ\" -> \"canned black beans\")
- price: the total price paid for this item
- quantity: how many were purchased (default 1 if not clear)

Return a JSON array:
```json
[
  {\"item_name\": \"canned black beans\", \"price\": 1.29, \"quantity\": 2},
  {\"item_name\": \"whole milk\", \"price\": 4.99, \"quantity\": 1}
]
```

Ignore tax lines, subtotals, totals, and non-grocery items (bags, coupons, etc.).
Return only the JSON array, wrapped in ```json``` code fences.";
