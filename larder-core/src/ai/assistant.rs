//! Assistant operations: recipe parsing and generation, week suggestions,
//! ingredient normalization, price estimation, and receipt reading.
//!
//! Every operation sends one prompt, locates a single fenced JSON block in
//! the response, and parses it. A missing block or malformed document is an
//! empty result, never a partially-trusted one; only a failed API call
//! surfaces as an error.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{prompts, AiError, ImageAttachment, LlmProvider};
use crate::db::fold_name;
use crate::models::{Recipe, RecipeIngredient, RecipeIngredientInput, RecipeInput};

/// Normalized shopping form for one recipe ingredient. All-`None` means the
/// model returned nothing for this ingredient and consumers should fall back
/// to the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizationResult {
    pub shopping_name: Option<String>,
    pub shopping_qty: Option<f64>,
    pub shopping_unit: Option<String>,
}

/// One suggested meal for the week planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealSuggestion {
    pub day: String,
    pub slot: String,
    pub meal: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One line item extracted from a receipt photo.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptItem {
    pub item_name: String,
    pub total_price: f64,
    pub quantity: i32,
    pub unit_price: f64,
}

fn json_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]+?)\s*```").unwrap())
}

/// Extract the first fenced JSON block from a response.
fn extract_json_block(text: &str) -> Option<&str> {
    json_block_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Fenced block when present, else the whole trimmed response. Some prompts
/// accept bare JSON as a fallback.
fn json_block_or_all(text: &str) -> &str {
    extract_json_block(text).unwrap_or_else(|| text.trim())
}

#[derive(Debug, Deserialize)]
struct RecipeJson {
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    servings: Option<i32>,
    #[serde(default)]
    prep_time: Option<String>,
    #[serde(default)]
    cook_time: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    rating: Option<i32>,
    #[serde(default)]
    ingredients: Vec<IngredientJson>,
}

#[derive(Debug, Deserialize)]
struct IngredientJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
}

/// Parse a recipe JSON document out of a model response.
fn parse_recipe_json(text: &str) -> Option<RecipeInput> {
    let parsed: RecipeJson = serde_json::from_str(json_block_or_all(text)).ok()?;

    let ingredients = parsed
        .ingredients
        .into_iter()
        .map(|ing| RecipeIngredientInput {
            name: ing.name.unwrap_or_default(),
            quantity: ing.quantity,
            unit: ing.unit,
            estimated_price: None,
            shopping_name: None,
            shopping_qty: None,
            shopping_unit: None,
        })
        .collect();

    Some(RecipeInput {
        name: parsed.name.unwrap_or_else(|| "Untitled Recipe".to_string()),
        description: parsed.description,
        servings: parsed.servings.unwrap_or(4),
        prep_time: parsed.prep_time,
        cook_time: parsed.cook_time,
        instructions: parsed.instructions,
        source_url: parsed.source_url,
        tags: parsed.tags,
        rating: parsed.rating.map(|r| r.clamp(1, 5)),
        ingredients,
    })
}

/// Send raw recipe text to the model and get back a structured recipe, or
/// None when the response is unusable.
pub async fn parse_recipe_text(
    provider: &dyn LlmProvider,
    text: &str,
) -> Result<Option<RecipeInput>, AiError> {
    let response = provider.complete(&prompts::parse_recipe_text(text)).await?;
    Ok(parse_recipe_json(&response))
}

/// Fetch a web page and have the model extract the recipe from it.
pub async fn parse_recipe_url(
    provider: &dyn LlmProvider,
    url: &str,
) -> Result<Option<RecipeInput>, AiError> {
    let html = reqwest::get(url)
        .await
        .map_err(|e| AiError::RequestFailed(format!("Failed to fetch URL: {e}")))?
        .text()
        .await
        .map_err(|e| AiError::RequestFailed(format!("Failed to fetch URL: {e}")))?;

    let page_text = strip_html(&html);
    let response = provider
        .complete(&prompts::parse_recipe_page(url, &page_text))
        .await?;

    Ok(parse_recipe_json(&response).map(|mut recipe| {
        recipe.source_url = Some(url.to_string());
        recipe
    }))
}

/// Strip a page down to its text content to keep the prompt small.
fn strip_html(html: &str) -> String {
    static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
    static STYLE_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static WS_RE: OnceLock<Regex> = OnceLock::new();

    let script = SCRIPT_RE
        .get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
    let style = STYLE_RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
    let tag = TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    let ws = WS_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let text = script.replace_all(html, "");
    let text = style.replace_all(&text, "");
    let text = tag.replace_all(&text, " ");
    let mut text = ws.replace_all(&text, " ").trim().to_string();

    // Truncate to avoid hitting token limits on long pages.
    const MAX_PAGE_CHARS: usize = 12_000;
    if text.len() > MAX_PAGE_CHARS {
        let mut cut = MAX_PAGE_CHARS;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

/// Generate a recipe from the current pantry contents.
pub async fn generate_recipe(
    provider: &dyn LlmProvider,
    pantry_summary: &str,
    preferences: &str,
) -> Result<Option<RecipeInput>, AiError> {
    let response = provider
        .complete(&prompts::generate_recipe(pantry_summary, preferences))
        .await?;
    Ok(parse_recipe_json(&response))
}

fn format_recipes_for_suggest(recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return "None saved yet".to_string();
    }
    recipes
        .iter()
        .map(|recipe| {
            let mut parts = vec![format!("- {}", recipe.name)];
            if let Some(tags) = &recipe.tags {
                parts.push(format!("[{tags}]"));
            }
            if let Some(rating) = recipe.rating {
                parts.push(format!("(rating: {rating}/5)"));
            }
            parts.join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Suggest a full week of meals from the pantry and saved recipes.
pub async fn suggest_week(
    provider: &dyn LlmProvider,
    pantry_summary: &str,
    recipes: &[Recipe],
    preferences: &str,
) -> Result<Vec<MealSuggestion>, AiError> {
    let recipes_text = format_recipes_for_suggest(recipes);
    let response = provider
        .complete(&prompts::suggest_week(pantry_summary, &recipes_text, preferences))
        .await?;

    let Some(block) = extract_json_block(&response) else {
        return Ok(vec![]);
    };
    Ok(serde_json::from_str(block).unwrap_or_default())
}

/// Convert recipe ingredients into their purchasable shopping form.
///
/// The result is positionally aligned with the input. Response entries are
/// matched by their explicit `index` field; inputs the model skipped come
/// back as all-`None` entries. A response without a parseable JSON array is
/// an empty result — nothing is ever partially normalized.
pub async fn normalize_ingredients(
    provider: &dyn LlmProvider,
    ingredients: &[RecipeIngredient],
) -> Result<Vec<NormalizationResult>, AiError> {
    if ingredients.is_empty() {
        return Ok(vec![]);
    }

    let lines: Vec<String> = ingredients
        .iter()
        .enumerate()
        .map(|(i, ing)| {
            let qty = ing
                .quantity
                .map(|q| format!("{q}"))
                .unwrap_or_else(|| "?".to_string());
            let unit = ing.unit.as_deref().unwrap_or("");
            format!("{i}. {qty} {unit} {}", ing.name)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let response = provider
        .complete(&prompts::normalize_ingredients(&lines.join("\n")))
        .await?;

    let Some(block) = extract_json_block(&response) else {
        return Ok(vec![]);
    };

    #[derive(Debug, Deserialize)]
    struct Entry {
        index: Option<usize>,
        #[serde(default)]
        shopping_name: Option<String>,
        #[serde(default)]
        shopping_qty: Option<f64>,
        #[serde(default)]
        shopping_unit: Option<String>,
    }

    let Ok(entries) = serde_json::from_str::<Vec<Entry>>(block) else {
        return Ok(vec![]);
    };

    let mut by_index: HashMap<usize, Entry> = HashMap::new();
    for (position, entry) in entries.into_iter().enumerate() {
        by_index.insert(entry.index.unwrap_or(position), entry);
    }

    Ok((0..ingredients.len())
        .map(|i| match by_index.get(&i) {
            Some(entry) => NormalizationResult {
                shopping_name: entry.shopping_name.clone(),
                shopping_qty: entry.shopping_qty,
                shopping_unit: entry.shopping_unit.clone(),
            },
            None => NormalizationResult::default(),
        })
        .collect())
}

/// Estimate current grocery unit prices for shopping list items.
///
/// Takes (name, quantity, unit) tuples; returns folded name -> price for
/// every entry the model filled in with a positive number.
pub async fn estimate_prices(
    provider: &dyn LlmProvider,
    items: &[(String, f64, String)],
) -> Result<HashMap<String, f64>, AiError> {
    if items.is_empty() {
        return Ok(HashMap::new());
    }

    let template = items
        .iter()
        .map(|(name, _, unit)| {
            let key = fold_name(name);
            if unit.is_empty() {
                format!("  \"{key}\": <price per unit>")
            } else {
                format!("  \"{key}\": <price per {unit}>")
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let response = provider
        .complete(&prompts::estimate_prices(&template))
        .await?;

    let Ok(parsed) = serde_json::from_str::<HashMap<String, serde_json::Value>>(json_block_or_all(
        &response,
    )) else {
        return Ok(HashMap::new());
    };

    // Only keep positive numeric values.
    let mut result = HashMap::new();
    for (key, value) in parsed {
        if let Some(price) = value.as_f64() {
            if price > 0.0 {
                result.insert(fold_name(&key), price);
            }
        }
    }
    Ok(result)
}

/// Extract item names and prices from receipt photo(s).
pub async fn parse_receipt_images(
    provider: &dyn LlmProvider,
    images: &[ImageAttachment],
) -> Result<Vec<ReceiptItem>, AiError> {
    if images.is_empty() {
        return Ok(vec![]);
    }

    let response = provider
        .complete_with_images(prompts::PARSE_RECEIPT, images)
        .await?;

    let Some(block) = extract_json_block(&response) else {
        return Ok(vec![]);
    };

    #[derive(Debug, Deserialize)]
    struct Entry {
        #[serde(default)]
        item_name: String,
        #[serde(default)]
        price: f64,
        #[serde(default = "one")]
        quantity: i32,
    }
    fn one() -> i32 {
        1
    }

    let Ok(entries) = serde_json::from_str::<Vec<Entry>>(block) else {
        return Ok(vec![]);
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.item_name.trim().to_string();
            if name.is_empty() || entry.price <= 0.0 || entry.quantity <= 0 {
                return None;
            }
            let unit_price =
                ((entry.price / f64::from(entry.quantity)) * 100.0).round() / 100.0;
            Some(ReceiptItem {
                item_name: name,
                total_price: entry.price,
                quantity: entry.quantity,
                unit_price,
            })
        })
        .collect())
}
