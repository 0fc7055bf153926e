use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One line of a drink recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    /// Ingredient name, e.g. "milk"
    pub name: String,
    /// Colour used when drawing the drink, e.g. "#ffe4c4"
    pub color: String,
    /// Proportion of the drink made of this ingredient
    pub parts: u32,
}

/// Public ingredient representation without quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShortIngredient {
    pub name: String,
    pub color: String,
}

/// A stored drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// Representation served on public routes
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    name: ingredient.name.clone(),
                    color: ingredient.color.clone(),
                })
                .collect(),
        }
    }

    /// Full representation served to authorized callers
    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A recipe as sent by clients: a single ingredient or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl RecipeInput {
    pub fn into_vec(self) -> Vec<Ingredient> {
        match self {
            Self::One(ingredient) => vec![ingredient],
            Self::Many(ingredients) => ingredients,
        }
    }
}

/// Why a drink payload was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("recipe must contain at least one ingredient")]
    EmptyRecipe,
    #[error("ingredient {0} must have a name and a color")]
    IncompleteIngredient(usize),
    #[error("ingredient {0} must have at least one part")]
    ZeroParts(usize),
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

fn validate_recipe(recipe: RecipeInput) -> Result<Vec<Ingredient>, ValidationError> {
    let recipe = recipe.into_vec();
    if recipe.is_empty() {
        return Err(ValidationError::EmptyRecipe);
    }
    for (index, ingredient) in recipe.iter().enumerate() {
        if ingredient.name.trim().is_empty() || ingredient.color.trim().is_empty() {
            return Err(ValidationError::IncompleteIngredient(index));
        }
        if ingredient.parts == 0 {
            return Err(ValidationError::ZeroParts(index));
        }
    }
    Ok(recipe)
}

/// Request body for creating a drink
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    /// Identifier to store the drink under
    pub id: i64,
    pub title: String,
    pub recipe: RecipeInput,
}

impl CreateDrinkRequest {
    pub fn validate(self) -> Result<NewDrink, ValidationError> {
        Ok(NewDrink {
            id: Some(self.id),
            title: validate_title(&self.title)?,
            recipe: validate_recipe(self.recipe)?,
        })
    }
}

/// Request body for updating a drink
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    /// Required, but the drink to update is the one named in the path
    pub id: i64,
    pub title: String,
    pub recipe: RecipeInput,
}

impl UpdateDrinkRequest {
    pub fn validate(self) -> Result<DrinkUpdate, ValidationError> {
        Ok(DrinkUpdate {
            title: Some(validate_title(&self.title)?),
            recipe: Some(validate_recipe(self.recipe)?),
        })
    }
}

/// Validated fields of a drink to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub id: Option<i64>,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Validated fields to change on an existing drink
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrinkUpdate {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

/// Body of the public drinks listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksShortList {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// Body of the detailed drinks listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksLongList {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

/// Body of successful create and update responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinkResponse {
    pub success: bool,
    pub drinks: DrinkLong,
}

/// Body of successful delete responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}
