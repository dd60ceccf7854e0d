//! Prompt text for each generation task.

pub const MIN_INGREDIENTS: usize = 5;
pub const MIN_STEPS: usize = 5;
pub const RECIPE_LIST_COUNT: usize = 10;
pub const VISION_RECIPE_COUNT: usize = 5;

/// What the vision model answers when the photo shows no food.
pub const NO_INGREDIENTS_MARKER: &str = "No ingredients detected";

pub const DEFAULT_CHAT_SYSTEM: &str = "You are an expert cooking assistant.";

const JSON_ONLY: &str = "Answer ONLY with valid JSON, no markdown, no comments.";

fn recipe_shape(servings: u32, with_used_ingredients: bool) -> String {
    let used = if with_used_ingredients {
        r#","usedIngredients":["detected ingredients this recipe uses"]"#
    } else {
        ""
    };
    format!(
        r#"{{"title":"Recipe name","category":"🍽️ Category","durationMinutes":30,"servings":{servings},"description":"A short appetising description in 1-2 sentences.","ingredients":["200g of ...","3 ..."],"steps":["Detailed step 1.","Step 2."]{used}}}"#
    )
}

pub fn single_recipe_system(servings: u32) -> String {
    format!(
        "You are an expert chef. Generate one recipe matching the request, for {servings} servings.\n\
         Use at least {MIN_INGREDIENTS} ingredients with quantities and at least {MIN_STEPS} detailed steps.\n\
         {JSON_ONLY} Use exactly this object format:\n{}",
        recipe_shape(servings, false)
    )
}

pub fn recipe_list_system(servings: u32) -> String {
    format!(
        "You are an expert chef. Generate exactly {RECIPE_LIST_COUNT} varied recipes matching the request, \
         each for {servings} servings.\n\
         Each recipe uses at least {MIN_INGREDIENTS} ingredients with quantities and at least {MIN_STEPS} detailed steps.\n\
         {JSON_ONLY} Use a JSON array of objects in exactly this format:\n[{}]",
        recipe_shape(servings, false)
    )
}

pub const VISION_EXTRACT_INSTRUCTION: &str = "Analyse this photo of a fridge or of food ingredients.\n\
List ONLY the food ingredients you can clearly see.\n\
Answer format: a plain comma-separated list.\n\
Example: chicken, tomatoes, garlic, cheese, eggs, butter\n\
Do not mention containers, brands or non-food objects.\n\
If you see no food, answer: \"No ingredients detected\"";

pub fn vision_recipes_system(servings: u32) -> String {
    format!(
        "You are an expert chef. You are given a list of available ingredients.\n\
         Generate exactly {VISION_RECIPE_COUNT} recipes that can be made with them \
         (salt, pepper and oil can be assumed available), each for {servings} servings.\n\
         For each recipe, report in usedIngredients which of the given ingredients it actually uses.\n\
         {JSON_ONLY} Use a JSON array of objects in exactly this format:\n[{}]",
        recipe_shape(servings, true)
    )
}

pub fn vision_recipes_user(ingredients: &str) -> String {
    format!(
        "Available ingredients: {ingredients}\n\
         Generate {VISION_RECIPE_COUNT} varied, detailed recipes \
         (at least {MIN_STEPS} steps and {MIN_INGREDIENTS} ingredients each)."
    )
}

pub fn nutrition_system() -> String {
    format!(
        "You are an expert nutritionist. Analyse the nutritional values of a recipe.\n\
         {JSON_ONLY} Use exactly this object format:\n\
         {{\n  \"perPortion\": {{\"calories\":0,\"proteins\":0,\"carbs\":0,\"fats\":0,\"fiber\":0,\"sugar\":0,\"sodium\":0}},\n  \
         \"perRecipe\": {{\"calories\":0,\"proteins\":0,\"carbs\":0,\"fats\":0,\"fiber\":0,\"sugar\":0,\"sodium\":0}},\n  \
         \"vitamins\": [{{\"name\":\"Vitamin C\",\"amount\":\"45mg\",\"daily\":\"50%\"}}],\n  \
         \"score\": 7,\n  \"scoreLabel\": \"Good\",\n  \"scoreColor\": \"green\",\n  \
         \"strengths\": [\"High in protein\"],\n  \"improvements\": [\"Add green vegetables\"],\n  \
         \"dietCompatibility\": {{\"vegetarian\":false,\"vegan\":false,\"glutenFree\":true,\"dairyFree\":false,\"keto\":false,\"lowCarb\":false}},\n  \
         \"glycemicIndex\": \"Medium\",\n  \"tip\": \"A personalised nutrition tip\"\n}}\n\
         The score goes from 1 (very poor) to 10 (excellent). scoreColor: \"green\" (7-10), \"orange\" (4-6), \"red\" (1-3)."
    )
}

pub fn nutrition_user(title: &str, servings: u32, ingredients: &[String]) -> String {
    format!(
        "Recipe: \"{title}\" for {servings} people.\nIngredients: {}",
        ingredients.join(", ")
    )
}

pub fn substitution_system() -> String {
    format!(
        "You are an expert chef specialised in ingredient substitutions.\n\
         {JSON_ONLY} Use exactly this object format:\n\
         {{\n  \"ingredient\": \"ingredient name\",\n  \"reason\": \"why one might want to replace it\",\n  \
         \"substitutes\": [{{\"name\":\"Substitute 1\",\"ratio\":\"same quantity\",\"impact\":\"Slightly different taste, similar texture\",\
         \"best_for\":\"sauces and hot dishes\",\"availability\":\"Easy to find\",\"emoji\":\"🥛\",\"tags\":[\"vegan\",\"lactose-free\"]}}],\n  \
         \"tips\": \"General advice on substituting this ingredient\"\n}}\n\
         Give 3 to 5 varied substitutes, from the closest to the most creative."
    )
}

pub fn substitution_user(ingredient: &str, context: Option<&str>, diet: Option<&str>) -> String {
    let mut text = format!("Ingredient to substitute: \"{ingredient}\"");
    if let Some(context) = context {
        text.push_str(&format!("\nContext: {context}"));
    }
    if let Some(diet) = diet {
        text.push_str(&format!("\nDiet: {diet}"));
    }
    text
}

pub fn meal_plan_system() -> String {
    format!(
        "You are a nutritionist and chef. Create a 7-day meal plan.\n\
         {JSON_ONLY} Use exactly this object format:\n\
         {{\n  \"weekSummary\": {{\"avgCalories\":1800,\"totalBudget\":\"~80€\",\"prepTime\":\"~30min/day\"}},\n  \
         \"days\": [{{\"day\":\"Monday\",\"dayEmoji\":\"🌅\",\"meals\":{{\
         \"breakfast\":{{\"name\":\"Name\",\"emoji\":\"🥐\",\"duration\":10,\"calories\":350,\"description\":\"Short description\"}},\
         \"lunch\":{{\"name\":\"Name\",\"emoji\":\"🥗\",\"duration\":25,\"calories\":550,\"description\":\"Short description\"}},\
         \"dinner\":{{\"name\":\"Name\",\"emoji\":\"🍝\",\"duration\":35,\"calories\":650,\"description\":\"Short description\"}},\
         \"snack\":{{\"name\":\"Name\",\"emoji\":\"🍎\",\"duration\":0,\"calories\":150,\"description\":\"Short description\"}}}},\
         \"totalCalories\":1700,\"tip\":\"Tip of the day\"}}],\n  \
         \"shoppingHighlights\": [\"Buy early in the week: ...\"],\n  \
         \"nutritionBalance\": \"Overall assessment of the nutritional balance\"\n}}"
    )
}

pub fn meal_plan_user(
    servings: u32,
    diet: Option<&str>,
    budget: Option<&str>,
    preferences: Option<&str>,
) -> String {
    let mut text = format!("Create a balanced meal plan for 7 days.\nPeople: {servings}");
    if let Some(diet) = diet {
        text.push_str(&format!("\nDiet: {diet}"));
    }
    if let Some(budget) = budget {
        text.push_str(&format!("\nBudget: {budget}"));
    }
    if let Some(preferences) = preferences {
        text.push_str(&format!("\nPreferences/constraints: {preferences}"));
    }
    text.push_str("\nMake sure the meals are varied, nutritionally balanced and doable.");
    text
}

/// True when the vision answer says no food was recognised.
pub fn reports_no_ingredients(text: &str) -> bool {
    text.to_lowercase()
        .contains(&NO_INGREDIENTS_MARKER.to_lowercase())
}
