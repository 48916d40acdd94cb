//! Diff of an edit buffer against the persisted tree.
//!
//! `save` must turn a partially-new, partially-persisted buffer into
//! the exact row writes: delete what left the buffer, update what
//! stayed, insert what has no id yet. The diff is computed up front
//! into a [`WritePlan`] so it can be checked without a database.

use itertools::Itertools;
use lombok::AllArgsConstructor;

use crate::database::models::{food::Food, used_ingredient::UsedIngredient};

use super::session::{CookingDraft, RowState};

#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct FoodUpdate {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
}

#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct UsedIngredientUpdate {
    pub id: i32,
    pub name: String,
    pub calories: i32,
    pub quantity: i32,
}

/// A new line under a food that already has a row.
#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct UsedIngredientInsert {
    pub food_id: i32,
    pub name: String,
    pub calories: i32,
    pub quantity: i32,
}

/// The values of a used-ingredient line whose parent food has no row
/// yet; the food_id is only known once that insert has run.
#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct UsedIngredientSeed {
    pub name: String,
    pub calories: i32,
    pub quantity: i32,
}

/// A food with no row yet, inserted together with all its lines.
#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct FoodInsert {
    pub recipe_id: i32,
    pub name: String,
    pub quantity: i32,
    pub used_ingredients: Vec<UsedIngredientSeed>,
}

/// Everything one `save` writes, in apply order: name, deletes,
/// updates, inserts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub rename_to: String,
    pub food_deletes: Vec<i32>,
    pub used_ingredient_deletes: Vec<i32>,
    pub food_updates: Vec<FoodUpdate>,
    pub used_ingredient_updates: Vec<UsedIngredientUpdate>,
    pub used_ingredient_inserts: Vec<UsedIngredientInsert>,
    pub food_inserts: Vec<FoodInsert>,
}

impl WritePlan {
    pub fn build(persisted: &[(Food, Vec<UsedIngredient>)], draft: &CookingDraft) -> Self {
        let mut plan = WritePlan {
            rename_to: draft.name.clone(),
            ..Default::default()
        };

        let kept_food_ids = draft
            .foods
            .iter()
            .filter_map(|food| food.state.id())
            .collect_vec();

        for (food, _) in persisted {
            if !kept_food_ids.contains(&food.id) {
                plan.food_deletes.push(food.id);
            }
        }

        for entry in &draft.foods {
            match entry.state {
                RowState::Persisted(food_id) => {
                    plan.food_updates
                        .push(FoodUpdate::new(food_id, entry.name.clone(), entry.quantity));

                    let kept_line_ids = entry
                        .used_ingredients
                        .iter()
                        .filter_map(|line| line.state.id())
                        .collect_vec();

                    if let Some((_, rows)) =
                        persisted.iter().find(|(food, _)| food.id == food_id)
                    {
                        for row in rows {
                            if !kept_line_ids.contains(&row.id) {
                                plan.used_ingredient_deletes.push(row.id);
                            }
                        }
                    }

                    for line in &entry.used_ingredients {
                        match line.state {
                            RowState::Persisted(line_id) => {
                                plan.used_ingredient_updates.push(UsedIngredientUpdate::new(
                                    line_id,
                                    line.name.clone(),
                                    line.calories,
                                    line.quantity,
                                ));
                            }
                            RowState::New => {
                                plan.used_ingredient_inserts.push(UsedIngredientInsert::new(
                                    food_id,
                                    line.name.clone(),
                                    line.calories,
                                    line.quantity,
                                ));
                            }
                        }
                    }
                }
                RowState::New => {
                    let lines = entry
                        .used_ingredients
                        .iter()
                        .map(|line| {
                            UsedIngredientSeed::new(line.name.clone(), line.calories, line.quantity)
                        })
                        .collect_vec();

                    plan.food_inserts.push(FoodInsert::new(
                        entry.recipe_id,
                        entry.name.clone(),
                        entry.quantity,
                        lines,
                    ));
                }
            }
        }

        plan
    }

    /// False when applying the plan would only re-write rows that are
    /// already there: the second run of an unchanged save.
    pub fn has_structural_changes(&self) -> bool {
        !(self.food_deletes.is_empty()
            && self.used_ingredient_deletes.is_empty()
            && self.used_ingredient_inserts.is_empty()
            && self.food_inserts.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooking::session::{FoodEntry, UsedIngredientEntry};

    fn persisted_food(id: i32, quantity: i32) -> Food {
        Food::new(id, 1, 10 + id, format!("Food {id}"), quantity)
    }

    fn persisted_line(id: i32, food_id: i32, quantity: i32) -> UsedIngredient {
        UsedIngredient::new(id, food_id, format!("Line {id}"), 50, quantity)
    }

    fn tree() -> Vec<(Food, Vec<UsedIngredient>)> {
        vec![
            (
                persisted_food(1, 100),
                vec![persisted_line(11, 1, 100)],
            ),
            (
                persisted_food(2, 200),
                vec![persisted_line(21, 2, 200)],
            ),
            (
                persisted_food(3, 300),
                vec![persisted_line(31, 3, 300)],
            ),
        ]
    }

    fn draft_of(persisted: &[(Food, Vec<UsedIngredient>)]) -> CookingDraft {
        let foods = persisted
            .iter()
            .map(|(food, rows)| FoodEntry::from_rows(food, rows))
            .collect();
        CookingDraft::new(1, "Sunday batch".to_owned(), foods)
    }

    #[test]
    fn unchanged_draft_plans_no_structural_changes() {
        let persisted = tree();
        let plan = WritePlan::build(&persisted, &draft_of(&persisted));

        assert!(!plan.has_structural_changes());
        assert_eq!(plan.food_updates.len(), 3);
        assert_eq!(plan.used_ingredient_updates.len(), 3);
        // The updates rewrite the persisted values verbatim.
        assert_eq!(plan.food_updates[0], FoodUpdate::new(1, "Food 1".to_owned(), 100));
        assert_eq!(
            plan.used_ingredient_updates[0],
            UsedIngredientUpdate::new(11, "Line 11".to_owned(), 50, 100)
        );
    }

    #[test]
    fn remove_edit_append_plans_one_of_each() {
        let persisted = tree();
        let mut draft = draft_of(&persisted);

        // Food #2 removed, food #1 edited, one fresh food appended.
        draft.remove_food(1);
        draft.foods[0].quantity = 150;
        draft.foods.push(FoodEntry::new(
            RowState::New,
            99,
            "Pancakes".to_owned(),
            0,
            vec![UsedIngredientEntry::new(
                RowState::New,
                "Flour".to_owned(),
                364,
                0,
            )],
        ));

        let plan = WritePlan::build(&persisted, &draft);

        assert_eq!(plan.food_deletes, vec![2]);
        assert_eq!(plan.food_inserts.len(), 1);
        assert_eq!(plan.food_inserts[0].recipe_id, 99);
        assert_eq!(plan.food_inserts[0].used_ingredients.len(), 1);
        assert_eq!(plan.food_updates.len(), 2);
        assert_eq!(plan.food_updates[0].quantity, 150);
        // Food #3 is carried as a verbatim update, nothing more.
        assert_eq!(plan.food_updates[1], FoodUpdate::new(3, "Food 3".to_owned(), 300));
        assert!(plan.used_ingredient_deletes.is_empty());
        assert!(plan.used_ingredient_inserts.is_empty());
    }

    #[test]
    fn dropped_line_under_a_kept_food_is_deleted() {
        let persisted = tree();
        let mut draft = draft_of(&persisted);

        draft.foods[0].remove_used_ingredient(0);

        let plan = WritePlan::build(&persisted, &draft);

        assert_eq!(plan.used_ingredient_deletes, vec![11]);
        assert!(plan.food_deletes.is_empty());
        assert!(plan.used_ingredient_updates.iter().all(|u| u.id != 11));
    }

    #[test]
    fn new_line_under_a_kept_food_is_inserted_with_its_food_id() {
        let persisted = tree();
        let mut draft = draft_of(&persisted);

        draft.foods[2].used_ingredients.push(UsedIngredientEntry::new(
            RowState::New,
            "Salt".to_owned(),
            0,
            5,
        ));

        let plan = WritePlan::build(&persisted, &draft);

        assert_eq!(plan.used_ingredient_inserts.len(), 1);
        assert_eq!(plan.used_ingredient_inserts[0].food_id, 3);
        assert_eq!(plan.used_ingredient_inserts[0].name, "Salt");
    }

    #[test]
    fn emptied_draft_deletes_everything() {
        let persisted = tree();
        let draft = CookingDraft::new(1, "Sunday batch".to_owned(), vec![]);

        let plan = WritePlan::build(&persisted, &draft);

        assert_eq!(plan.food_deletes, vec![1, 2, 3]);
        assert!(plan.food_updates.is_empty());
        // Lines under deleted foods go with their food, not one by one.
        assert!(plan.used_ingredient_deletes.is_empty());
    }

    #[test]
    fn rename_is_always_carried() {
        let persisted = tree();
        let mut draft = draft_of(&persisted);
        draft.name = "Monday batch".to_owned();

        let plan = WritePlan::build(&persisted, &draft);

        assert_eq!(plan.rename_to, "Monday batch");
        assert!(!plan.has_structural_changes());
    }
}
