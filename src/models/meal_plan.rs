use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response_parser::{Coerce, Fields};

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub avg_calories: u32,
    pub total_budget: String,
    pub prep_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub emoji: String,
    pub duration: u32,
    pub calories: u32,
    pub description: String,
}

impl Meal {
    fn from_fields(fields: Fields<'_>) -> Self {
        Self {
            name: fields.string("name", ""),
            emoji: fields.string("emoji", ""),
            duration: fields.count("duration", 0),
            calories: fields.count("calories", 0),
            description: fields.string("description", ""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    pub snack: Meal,
}

impl Meals {
    pub fn total_calories(&self) -> u32 {
        [&self.breakfast, &self.lunch, &self.dinner, &self.snack]
            .iter()
            .map(|m| m.calories)
            .fold(0, u32::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day: String,
    pub day_emoji: String,
    pub meals: Meals,
    pub total_calories: u32,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub week_summary: WeekSummary,
    pub days: Vec<DayPlan>,
    pub shopping_highlights: Vec<String>,
    pub nutrition_balance: String,
}

fn day_plan(index: usize, value: &Value) -> DayPlan {
    let fields = Fields::new("day", value);
    let meals = fields.nested("meals", "meals");
    let meals = Meals {
        breakfast: Meal::from_fields(meals.nested("breakfast", "meal")),
        lunch: Meal::from_fields(meals.nested("lunch", "meal")),
        dinner: Meal::from_fields(meals.nested("dinner", "meal")),
        snack: Meal::from_fields(meals.nested("snack", "meal")),
    };
    let default_day = WEEKDAYS.get(index).copied().unwrap_or("");

    DayPlan {
        day: fields.string("day", default_day),
        day_emoji: fields.string("dayEmoji", ""),
        total_calories: fields.count("totalCalories", meals.total_calories()),
        meals,
        tip: fields.string("tip", ""),
    }
}

impl Coerce for MealPlan {
    type Context = ();

    fn coerce(value: &Value, _ctx: &()) -> Self {
        let fields = Fields::new("mealPlan", value);
        let summary = fields.nested("weekSummary", "weekSummary");
        let days: Vec<DayPlan> = fields
            .objects("days")
            .into_iter()
            .enumerate()
            .map(|(i, day)| day_plan(i, day))
            .collect();

        let avg_default = if days.is_empty() {
            0
        } else {
            let total: u64 = days.iter().map(|d| u64::from(d.total_calories)).sum();
            u32::try_from(total / days.len() as u64).unwrap_or(u32::MAX)
        };

        Self {
            week_summary: WeekSummary {
                avg_calories: summary.count("avgCalories", avg_default),
                total_budget: summary.string("totalBudget", ""),
                prep_time: summary.string("prepTime", ""),
            },
            days,
            shopping_highlights: fields.strings("shoppingHighlights"),
            nutrition_balance: fields.string("nutritionBalance", ""),
        }
    }
}
