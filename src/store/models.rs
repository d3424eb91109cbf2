use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One line of a drink's recipe. Owned by its drink and serialized as an
/// embedded list, never as a row of its own. The quantity is any JSON
/// number; fractional parts are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    pub color: String,
    pub parts: serde_json::Number,
}

/// One purchasable drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientEntry>,
}

impl Drink {
    /// Listing form: omits the recipe.
    pub fn short(&self) -> Value {
        json!({ "id": self.id, "title": self.title })
    }

    /// Detail form: includes the recipe.
    pub fn long(&self) -> Value {
        json!({ "id": self.id, "title": self.title, "recipe": self.recipe })
    }
}

/// Normalize a wire-level `recipe` value.
///
/// A single entry object is wrapped into a one-element list. Empty arrays
/// and objects, and anything that is not an array or object, count as "not
/// supplied", preserving the API's historical treat-falsy-as-missing
/// behavior. A non-empty value whose entries do not parse is an error.
pub fn normalize_recipe(
    value: Option<&Value>,
) -> Result<Option<Vec<IngredientEntry>>, serde_json::Error> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(Value::Object(map)) if !map.is_empty() => {
            serde_json::from_value::<IngredientEntry>(Value::Object(map.clone()))
                .map(|entry| Some(vec![entry]))
        }
        _ => Ok(None),
    }
}
