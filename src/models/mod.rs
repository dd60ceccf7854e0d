pub mod meal_plan;
pub mod nutrition;
pub mod recipe;
pub mod substitution;

pub use meal_plan::{DayPlan, Meal, MealPlan, Meals, WeekSummary};
pub use nutrition::{DietCompatibility, GlycemicIndex, NutrientTotals, NutritionReport, ScoreColor, Vitamin};
pub use recipe::{IngredientSet, Illustrated, RecipeContext, RecipeDraft, VisionRecipe};
pub use substitution::{Substitute, SubstitutionContext, SubstitutionResult};
