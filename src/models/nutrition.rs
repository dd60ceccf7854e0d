use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response_parser::{Coerce, Fields};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl NutrientTotals {
    fn from_fields(fields: Fields<'_>) -> Self {
        // Negative amounts make no sense for a recipe.
        let amount = |key: &str| fields.number(key, 0.0).max(0.0);
        Self {
            calories: amount("calories"),
            proteins: amount("proteins"),
            carbs: amount("carbs"),
            fats: amount("fats"),
            fiber: amount("fiber"),
            sugar: amount("sugar"),
            sodium: amount("sodium"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitamin {
    pub name: String,
    pub amount: String,
    pub daily: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Green,
    Orange,
    Red,
}

impl ScoreColor {
    /// green 7-10, orange 4-6, red 1-3
    pub fn for_score(score: u8) -> Self {
        match score {
            7.. => ScoreColor::Green,
            4..=6 => ScoreColor::Orange,
            _ => ScoreColor::Red,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "green" => Some(ScoreColor::Green),
            "orange" => Some(ScoreColor::Orange),
            "red" => Some(ScoreColor::Red),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlycemicIndex {
    Low,
    Medium,
    High,
    Unknown,
}

impl GlycemicIndex {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" | "bas" | "faible" => GlycemicIndex::Low,
            "medium" | "moderate" | "moyen" => GlycemicIndex::Medium,
            "high" | "élevé" | "eleve" | "haut" => GlycemicIndex::High,
            _ => GlycemicIndex::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietCompatibility {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub keto: bool,
    pub low_carb: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionReport {
    pub per_portion: NutrientTotals,
    pub per_recipe: NutrientTotals,
    pub vitamins: Vec<Vitamin>,
    pub score: u8,
    pub score_label: String,
    pub score_color: ScoreColor,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub diet_compatibility: DietCompatibility,
    pub glycemic_index: GlycemicIndex,
    pub tip: String,
}

const DEFAULT_SCORE: i64 = 5;

fn score_label(score: u8) -> &'static str {
    match score {
        9.. => "Excellent",
        7..=8 => "Good",
        4..=6 => "Average",
        _ => "Poor",
    }
}

impl Coerce for NutritionReport {
    type Context = ();

    fn coerce(value: &Value, _ctx: &()) -> Self {
        let fields = Fields::new("nutrition", value);

        let score = fields
            .get("score")
            .and_then(crate::response_parser::lenient_int)
            .unwrap_or(DEFAULT_SCORE)
            .clamp(1, 10) as u8;
        let score_color = fields
            .opt_string("scoreColor")
            .and_then(|s| ScoreColor::parse(&s))
            .unwrap_or_else(|| ScoreColor::for_score(score));

        let vitamins = fields
            .objects("vitamins")
            .into_iter()
            .map(|v| Fields::new("vitamin", v))
            .filter_map(|v| {
                Some(Vitamin {
                    name: v.opt_string("name")?,
                    amount: v.string("amount", ""),
                    daily: v.string("daily", ""),
                })
            })
            .collect();

        let diet = fields.nested("dietCompatibility", "dietCompatibility");

        Self {
            per_portion: NutrientTotals::from_fields(fields.nested("perPortion", "perPortion")),
            per_recipe: NutrientTotals::from_fields(fields.nested("perRecipe", "perRecipe")),
            vitamins,
            score,
            score_label: fields.string("scoreLabel", score_label(score)),
            score_color,
            strengths: fields.strings("strengths"),
            improvements: fields.strings("improvements"),
            diet_compatibility: DietCompatibility {
                vegetarian: diet.boolean("vegetarian", false),
                vegan: diet.boolean("vegan", false),
                gluten_free: diet.boolean("glutenFree", false),
                dairy_free: diet.boolean("dairyFree", false),
                keto: diet.boolean("keto", false),
                low_carb: diet.boolean("lowCarb", false),
            },
            glycemic_index: fields
                .opt_string("glycemicIndex")
                .map(|s| GlycemicIndex::parse(&s))
                .unwrap_or(GlycemicIndex::Unknown),
            tip: fields.string("tip", ""),
        }
    }
}
