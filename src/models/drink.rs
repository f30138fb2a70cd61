//! Drink model and its two public projections.

use serde::{Deserialize, Serialize};

/// Longest title accepted for a drink.
pub const MAX_TITLE_LEN: usize = 80;

/// One line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Recipe line as exposed on the public listing (no ingredient names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// A drink in its long form: full recipe included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A drink in its short form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl Drink {
    /// Public projection: keeps only color and parts of each ingredient.
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

/// A recipe as sent by clients: either a list or a single ingredient.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    fn into_validated(self) -> Result<Vec<Ingredient>, ValidationError> {
        let recipe = match self {
            RecipeInput::Many(items) => items,
            RecipeInput::One(item) => vec![item],
        };

        if recipe.is_empty() {
            return Err(ValidationError::new("recipe must contain at least one ingredient"));
        }
        for ingredient in &recipe {
            if ingredient.name.trim().is_empty() {
                return Err(ValidationError::new("ingredient name is required"));
            }
            if ingredient.color.trim().is_empty() {
                return Err(ValidationError::new("ingredient color is required"));
            }
        }
        Ok(recipe)
    }
}

/// Request body for `POST /drinks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

/// Request body for `PATCH /drinks/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// A validated drink ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A validated partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    /// Apply the patch to an existing drink.
    pub fn apply(&self, drink: &mut Drink) {
        if let Some(title) = &self.title {
            drink.title = title.clone();
        }
        if let Some(recipe) = &self.recipe {
            drink.recipe = recipe.clone();
        }
    }
}

impl CreateDrinkRequest {
    pub fn validate(self) -> Result<NewDrink, ValidationError> {
        Ok(NewDrink {
            title: validate_title(self.title)?,
            recipe: self.recipe.into_validated()?,
        })
    }
}

impl UpdateDrinkRequest {
    pub fn validate(self) -> Result<DrinkPatch, ValidationError> {
        Ok(DrinkPatch {
            title: self.title.map(validate_title).transpose()?,
            recipe: self.recipe.map(RecipeInput::into_validated).transpose()?,
        })
    }
}

fn validate_title(title: String) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

/// Rejected request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValidationError {}
