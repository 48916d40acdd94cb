//! In-memory edit buffer for a cooking session.
//!
//! The buffer mirrors the food/used-ingredient tree a client edits
//! between loading a cooking and saving it. Everything here is pure:
//! the database only comes in when [`super::Cookings::save`] diffs the
//! buffer against the persisted rows.

use lombok::AllArgsConstructor;
use validator::Validate;

use crate::database::models::{
    food::Food, ingredient::Ingredient, recipe::Recipe, used_ingredient::UsedIngredient,
};

/// Where a draft row stands relative to the database.
///
/// A removed row needs no third state: the save plan recovers
/// deletions by diffing the buffer against the persisted tree, so
/// there is no deletion mark to forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Exists only in the buffer; insert on save.
    New,
    /// Backed by a row with this id; update on save.
    Persisted(i32),
}

impl RowState {
    pub fn id(&self) -> Option<i32> {
        match *self {
            RowState::New => None,
            RowState::Persisted(id) => Some(id),
        }
    }
}

/// A quantity-bearing snapshot of a catalog ingredient. Name and
/// calories were copied at creation time and live their own life.
#[derive(Validate, AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct UsedIngredientEntry {
    pub state: RowState,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "calories must not be negative"))]
    pub calories: i32,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

impl UsedIngredientEntry {
    /// Copy of a catalog ingredient, quantity left for the user.
    pub fn snapshot(ingredient: &Ingredient) -> Self {
        Self::new(
            RowState::New,
            ingredient.name.clone(),
            ingredient.calories,
            0,
        )
    }

    pub fn from_row(row: &UsedIngredient) -> Self {
        Self::new(
            RowState::Persisted(row.id),
            row.name.clone(),
            row.calories,
            row.quantity,
        )
    }

    /// This line's share of the food's calories. Calories are per
    /// 100g, so scale by quantity/100 and round. Each line rounds on
    /// its own so the sum always matches what is shown per line.
    pub fn calories_for_quantity(&self) -> i64 {
        (self.calories as f64 * self.quantity as f64 / 100.0).round() as i64
    }
}

/// One food in the buffer, with its used-ingredient lines.
#[derive(Validate, AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct FoodEntry {
    pub state: RowState,
    pub recipe_id: i32,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    /// Grams of the cooked result. Defaults to the ingredient sum but
    /// the user may type over it to account for cooking loss or gain.
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    #[validate(nested)]
    pub used_ingredients: Vec<UsedIngredientEntry>,
}

impl FoodEntry {
    /// Expansion of one recipe: the food takes the recipe's name and
    /// starts at quantity 0 with one zero-quantity snapshot per linked
    /// ingredient, in the order given (name ascending from the query).
    pub fn from_recipe(recipe: &Recipe, ingredients: &[Ingredient]) -> Self {
        let used_ingredients = ingredients
            .iter()
            .map(UsedIngredientEntry::snapshot)
            .collect();

        Self::new(
            RowState::New,
            recipe.id,
            recipe.name.clone(),
            0,
            used_ingredients,
        )
    }

    pub fn from_rows(food: &Food, rows: &[UsedIngredient]) -> Self {
        let used_ingredients = rows.iter().map(UsedIngredientEntry::from_row).collect();

        Self::new(
            RowState::Persisted(food.id),
            food.recipe_id,
            food.name.clone(),
            food.quantity,
            used_ingredients,
        )
    }

    pub fn add_used_ingredient(&mut self, ingredient: &Ingredient) {
        self.used_ingredients
            .push(UsedIngredientEntry::snapshot(ingredient));
    }

    pub fn remove_used_ingredient(&mut self, index: usize) -> UsedIngredientEntry {
        self.used_ingredients.remove(index)
    }

    /// Total calories of the food: per-line rounded contributions,
    /// summed.
    pub fn total_calories(&self) -> i64 {
        self.used_ingredients
            .iter()
            .map(UsedIngredientEntry::calories_for_quantity)
            .sum()
    }

    /// Calories per 100g of the cooked food, or `None` while the
    /// quantity is still zero. Totals a tiny quantity cannot express
    /// in an `i32` clamp to the nearest bound.
    pub fn calorie_density(&self) -> Option<i32> {
        if self.quantity == 0 {
            return None;
        }

        let density = (self.total_calories() as f64 / (self.quantity as f64 / 100.0)).round();

        Some(density.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
    }

    pub fn ingredient_quantity_sum(&self) -> i32 {
        self.used_ingredients
            .iter()
            .map(|entry| entry.quantity)
            .sum()
    }

    /// Fired when the user clears the quantity field: fall back to
    /// the ingredient sum. Must not run on ordinary quantity edits,
    /// or it would fight manual overrides.
    pub fn reset_quantity(&mut self) {
        self.quantity = self.ingredient_quantity_sum();
    }
}

/// The whole edit buffer for one persisted cooking.
#[derive(Validate, AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct CookingDraft {
    pub id: i32,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(nested)]
    pub foods: Vec<FoodEntry>,
}

impl CookingDraft {
    /// Appends the expansion of one more recipe to an open buffer.
    pub fn add_food_from_recipe(&mut self, recipe: &Recipe, ingredients: &[Ingredient]) {
        self.foods.push(FoodEntry::from_recipe(recipe, ingredients));
    }

    pub fn remove_food(&mut self, index: usize) -> FoodEntry {
        self.foods.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(calories: i32, quantity: i32) -> UsedIngredientEntry {
        UsedIngredientEntry::new(RowState::New, "Something".to_owned(), calories, quantity)
    }

    fn food(quantity: i32, entries: Vec<UsedIngredientEntry>) -> FoodEntry {
        FoodEntry::new(RowState::New, 1, "Dinner".to_owned(), quantity, entries)
    }

    #[test]
    fn density_is_undefined_at_zero_quantity() {
        let food = food(0, vec![entry(52, 200)]);
        assert_eq!(food.calorie_density(), None);
    }

    #[test]
    fn density_matches_the_worked_example() {
        // 52kcal x 200g and 89kcal x 100g cooked down to 300g:
        // round(104) + round(89) = 193, round(193 / 3) = 64.
        let food = food(300, vec![entry(52, 200), entry(89, 100)]);
        assert_eq!(food.total_calories(), 193);
        assert_eq!(food.calorie_density(), Some(64));
    }

    #[test]
    fn lines_round_before_summing() {
        // 33kcal x 50g is 16.5 per line. Two lines must give
        // 17 + 17 = 34, not round(16.5 + 16.5) = 33.
        let food = food(100, vec![entry(33, 50), entry(33, 50)]);
        assert_eq!(food.total_calories(), 34);
    }

    #[test]
    fn density_clamps_when_a_gram_holds_too_many_calories() {
        // One gram carrying an astronomical line total would overflow
        // an i32 density; it must top out, not wrap.
        let food = food(1, vec![entry(i32::MAX, i32::MAX)]);
        assert_eq!(food.calorie_density(), Some(i32::MAX));
    }

    #[test]
    fn density_is_never_negative() {
        let food = food(250, vec![entry(0, 200), entry(1, 10)]);
        assert!(food.calorie_density().unwrap() >= 0);
    }

    #[test]
    fn expansion_seeds_zero_quantities_in_name_order() {
        let recipe = Recipe::new(7, "Apple pie".to_owned());
        let ingredients = vec![
            Ingredient::new(1, "Apple".to_owned(), 52),
            Ingredient::new(2, "Butter".to_owned(), 717),
        ];

        let food = FoodEntry::from_recipe(&recipe, &ingredients);

        assert_eq!(food.state, RowState::New);
        assert_eq!(food.recipe_id, 7);
        assert_eq!(food.name, "Apple pie");
        assert_eq!(food.quantity, 0);
        assert_eq!(food.used_ingredients.len(), 2);
        assert_eq!(food.used_ingredients[0].name, "Apple");
        assert_eq!(food.used_ingredients[0].calories, 52);
        assert_eq!(food.used_ingredients[0].quantity, 0);
        assert_eq!(food.used_ingredients[1].name, "Butter");
    }

    #[test]
    fn reset_quantity_returns_to_the_ingredient_sum() {
        let mut food = food(999, vec![entry(52, 200), entry(89, 100)]);

        food.reset_quantity();

        assert_eq!(food.quantity, 300);
    }

    #[test]
    fn snapshots_do_not_follow_the_catalog() {
        let mut ingredient = Ingredient::new(1, "Apple".to_owned(), 52);
        let line = UsedIngredientEntry::snapshot(&ingredient);

        ingredient.calories = 9000;

        assert_eq!(line.calories, 52);
    }

    #[test]
    fn removing_a_food_shrinks_the_buffer() {
        let mut draft = CookingDraft::new(
            1,
            "Meal prep".to_owned(),
            vec![food(0, vec![]), food(0, vec![entry(10, 10)])],
        );

        let removed = draft.remove_food(0);

        assert_eq!(removed.used_ingredients.len(), 0);
        assert_eq!(draft.foods.len(), 1);
    }

    #[test]
    fn added_ingredient_lands_unmaterialized() {
        let mut food = food(0, vec![]);
        food.add_used_ingredient(&Ingredient::new(3, "Sugar".to_owned(), 387));

        assert_eq!(food.used_ingredients.len(), 1);
        assert_eq!(food.used_ingredients[0].state, RowState::New);
        assert_eq!(food.used_ingredients[0].quantity, 0);
    }

    #[test]
    fn draft_validation_reaches_nested_lines() {
        let draft = CookingDraft::new(
            1,
            "Meal prep".to_owned(),
            vec![food(100, vec![entry(52, -5)])],
        );

        assert!(draft.validate().is_err());
    }

    #[test]
    fn short_food_name_fails_validation() {
        let draft = CookingDraft::new(
            1,
            "Meal prep".to_owned(),
            vec![FoodEntry::new(RowState::New, 1, "X".to_owned(), 0, vec![])],
        );

        assert!(draft.validate().is_err());
    }
}
