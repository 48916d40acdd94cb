pub mod cooking;
pub mod food;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod used_ingredient;
