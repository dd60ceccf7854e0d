use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response_parser::{Coerce, Fields};

pub const MAX_SUBSTITUTES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitute {
    pub name: String,
    pub ratio: String,
    pub impact: String,
    pub best_for: String,
    pub availability: String,
    pub emoji: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionResult {
    pub ingredient: String,
    pub reason: String,
    pub substitutes: Vec<Substitute>,
    pub tips: String,
}

/// The ingredient the caller asked about.
pub struct SubstitutionContext {
    pub ingredient: String,
}

impl Coerce for SubstitutionResult {
    type Context = SubstitutionContext;

    fn coerce(value: &Value, ctx: &SubstitutionContext) -> Self {
        let fields = Fields::new("substitution", value);
        let substitutes = fields
            .objects("substitutes")
            .into_iter()
            .map(|s| Fields::new("substitute", s))
            .filter_map(|s| {
                Some(Substitute {
                    name: s.opt_string("name")?,
                    ratio: s.string("ratio", "same quantity"),
                    impact: s.string("impact", ""),
                    best_for: s.string("best_for", ""),
                    availability: s.string("availability", ""),
                    emoji: s.string("emoji", ""),
                    tags: s.strings("tags"),
                })
            })
            .take(MAX_SUBSTITUTES)
            .collect();

        Self {
            ingredient: fields.string("ingredient", &ctx.ingredient),
            reason: fields.string("reason", ""),
            substitutes,
            tips: fields.string("tips", ""),
        }
    }
}
