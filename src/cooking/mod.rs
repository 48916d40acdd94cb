//! Cooking sessions: recipe expansion, the edit buffer, and the
//! reconciling save.

pub mod reconcile;
pub mod session;

use diesel::prelude::*;
use itertools::Itertools;
use lombok::AllArgsConstructor;
use tracing::trace_span;
use validator::Validate;

use crate::{
    auth::Caller,
    catalog::SEARCH_PAGE_SIZE,
    database::{
        connection::PgPool,
        models::{
            cooking::{Cooking, NewCooking},
            food::{Food, NewFood},
            recipe::Recipe,
            used_ingredient::{NewUsedIngredient, UsedIngredient},
        },
    },
    error::{Error, Result},
};

use self::{
    reconcile::WritePlan,
    session::{CookingDraft, FoodEntry},
};

#[derive(Validate, Debug, Clone)]
pub struct CookingInput {
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    /// Expanded in order: the first selected recipe becomes the first
    /// food.
    pub recipe_ids: Vec<i32>,
}

/// A cooking with its full food/used-ingredient tree, in insertion
/// order.
#[derive(Debug)]
pub struct CookingTree {
    pub cooking: Cooking,
    pub foods: Vec<(Food, Vec<UsedIngredient>)>,
}

impl CookingTree {
    /// Seeds an edit buffer from the persisted rows.
    pub fn to_draft(&self) -> CookingDraft {
        let foods = self
            .foods
            .iter()
            .map(|(food, rows)| FoodEntry::from_rows(food, rows))
            .collect();

        CookingDraft::new(self.cooking.id, self.cooking.name.clone(), foods)
    }
}

#[derive(AllArgsConstructor)]
pub struct Cookings {
    pool: PgPool,
}

impl Cookings {
    /// Creates a cooking by expanding the chosen recipes: one food per
    /// recipe, one zero-quantity snapshot per linked ingredient.
    pub fn create(&self, _caller: &Caller, input: &CookingInput) -> Result<CookingTree> {
        input.validate()?;

        let span = trace_span!("creating cooking");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::{cookings, foods, recipes, used_ingredients};

            let cooking = diesel::insert_into(cookings::table)
                .values(NewCooking { name: &input.name })
                .returning(Cooking::as_returning())
                .get_result(connection)?;

            let mut tree = Vec::with_capacity(input.recipe_ids.len());

            for &recipe_id in &input.recipe_ids {
                let recipe = recipes::table
                    .find(recipe_id)
                    .select(Recipe::as_select())
                    .first(connection)
                    .optional()?
                    .ok_or(Error::NotFound("recipe"))?;

                let food = diesel::insert_into(foods::table)
                    .values(NewFood {
                        cooking_id: cooking.id,
                        recipe_id: recipe.id,
                        name: &recipe.name,
                        quantity: 0,
                    })
                    .returning(Food::as_returning())
                    .get_result(connection)?;

                let ingredients = recipe.ingredients(connection)?;
                let snapshots = ingredients
                    .iter()
                    .map(|ingredient| NewUsedIngredient {
                        food_id: food.id,
                        name: &ingredient.name,
                        calories: ingredient.calories,
                        quantity: 0,
                    })
                    .collect_vec();

                let rows = diesel::insert_into(used_ingredients::table)
                    .values(&snapshots)
                    .returning(UsedIngredient::as_returning())
                    .get_results(connection)?;

                tree.push((food, rows));
            }

            Ok(CookingTree {
                cooking,
                foods: tree,
            })
        })
    }

    /// Case-insensitive substring search, most recently updated first.
    pub fn search(&self, _caller: &Caller, name_part: &str) -> Result<Vec<Cooking>> {
        use crate::database::schema::cookings;

        let span = trace_span!("searching cookings");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let found = cookings::table
            .filter(cookings::name.ilike(format!("%{name_part}%")))
            .order(cookings::updated_at.desc())
            .limit(SEARCH_PAGE_SIZE)
            .select(Cooking::as_select())
            .load(&mut connection)?;

        Ok(found)
    }

    pub fn get_by_id(&self, _caller: &Caller, cooking_id: i32) -> Result<CookingTree> {
        use crate::database::schema::cookings;

        let span = trace_span!("loading cooking");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let cooking = cookings::table
            .find(cooking_id)
            .select(Cooking::as_select())
            .first(&mut connection)
            .optional()?
            .ok_or(Error::NotFound("cooking"))?;

        let foods = load_tree(&cooking, &mut connection)?;

        Ok(CookingTree { cooking, foods })
    }

    /// Fetches a recipe and appends its expansion to an open buffer.
    pub fn add_food_from_recipe(
        &self,
        _caller: &Caller,
        draft: &mut CookingDraft,
        recipe_id: i32,
    ) -> Result<()> {
        use crate::database::schema::recipes;

        let span = trace_span!("adding food from recipe");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let recipe = recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(&mut connection)
            .optional()?
            .ok_or(Error::NotFound("recipe"))?;

        let ingredients = recipe.ingredients(&mut connection)?;

        draft.add_food_from_recipe(&recipe, &ingredients);

        Ok(())
    }

    /// Reconciles the edit buffer against the persisted tree in one
    /// transaction: name update, removed rows deleted, kept rows
    /// updated, new rows inserted. Saving the same buffer again right
    /// away only re-writes what is already there.
    pub fn save(&self, _caller: &Caller, draft: &CookingDraft) -> Result<()> {
        draft.validate()?;

        let span = trace_span!("saving cooking");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::cookings;

            let cooking = cookings::table
                .find(draft.id)
                .select(Cooking::as_select())
                .first(connection)
                .optional()?
                .ok_or(Error::NotFound("cooking"))?;

            let persisted = load_tree(&cooking, connection)?;

            // Every persisted id in the buffer must belong to this
            // cooking; a stray id aborts the whole save.
            let known_food_ids = persisted.iter().map(|(food, _)| food.id).collect_vec();
            let known_line_ids = persisted
                .iter()
                .flat_map(|(_, rows)| rows.iter().map(|row| row.id))
                .collect_vec();

            for entry in &draft.foods {
                if let Some(id) = entry.state.id() {
                    if !known_food_ids.contains(&id) {
                        return Err(Error::NotFound("food"));
                    }
                }
                for line in &entry.used_ingredients {
                    if let Some(id) = line.state.id() {
                        if !known_line_ids.contains(&id) {
                            return Err(Error::NotFound("used ingredient"));
                        }
                    }
                }
            }

            let plan = WritePlan::build(&persisted, draft);

            apply_plan(&plan, draft.id, connection)
        })
    }

    /// Deletes the cooking and cascades over its foods and their used
    /// ingredients.
    pub fn delete(&self, _caller: &Caller, cooking_id: i32) -> Result<()> {
        let span = trace_span!("deleting cooking");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::{cookings, foods, used_ingredients};

            let food_ids: Vec<i32> = foods::table
                .filter(foods::cooking_id.eq(cooking_id))
                .select(foods::id)
                .load(connection)?;

            diesel::delete(
                used_ingredients::table.filter(used_ingredients::food_id.eq_any(&food_ids)),
            )
            .execute(connection)?;

            diesel::delete(foods::table.filter(foods::cooking_id.eq(cooking_id)))
                .execute(connection)?;

            let deleted = diesel::delete(cookings::table.find(cooking_id)).execute(connection)?;

            if deleted == 0 {
                return Err(Error::NotFound("cooking"));
            }

            Ok(())
        })
    }
}

fn load_tree(
    cooking: &Cooking,
    connection: &mut PgConnection,
) -> QueryResult<Vec<(Food, Vec<UsedIngredient>)>> {
    use crate::database::schema::used_ingredients;

    let foods = cooking.foods(connection)?;

    let grouped = UsedIngredient::belonging_to(&foods)
        .select(UsedIngredient::as_select())
        .order(used_ingredients::id.asc())
        .load(connection)?
        .grouped_by(&foods);

    Ok(foods.into_iter().zip(grouped).collect())
}

fn apply_plan(plan: &WritePlan, cooking_id: i32, connection: &mut PgConnection) -> Result<()> {
    use crate::database::schema::{cookings, foods, used_ingredients};

    diesel::update(cookings::table.find(cooking_id))
        .set((
            cookings::name.eq(&plan.rename_to),
            cookings::updated_at.eq(diesel::dsl::now),
        ))
        .execute(connection)?;

    if !plan.food_deletes.is_empty() {
        diesel::delete(
            used_ingredients::table
                .filter(used_ingredients::food_id.eq_any(&plan.food_deletes)),
        )
        .execute(connection)?;

        diesel::delete(foods::table.filter(foods::id.eq_any(&plan.food_deletes)))
            .execute(connection)?;
    }

    if !plan.used_ingredient_deletes.is_empty() {
        diesel::delete(
            used_ingredients::table
                .filter(used_ingredients::id.eq_any(&plan.used_ingredient_deletes)),
        )
        .execute(connection)?;
    }

    for update in &plan.food_updates {
        diesel::update(foods::table.find(update.id))
            .set((
                foods::name.eq(&update.name),
                foods::quantity.eq(update.quantity),
                foods::updated_at.eq(diesel::dsl::now),
            ))
            .execute(connection)?;
    }

    for update in &plan.used_ingredient_updates {
        diesel::update(used_ingredients::table.find(update.id))
            .set((
                used_ingredients::name.eq(&update.name),
                used_ingredients::calories.eq(update.calories),
                used_ingredients::quantity.eq(update.quantity),
                used_ingredients::updated_at.eq(diesel::dsl::now),
            ))
            .execute(connection)?;
    }

    for insert in &plan.used_ingredient_inserts {
        diesel::insert_into(used_ingredients::table)
            .values(NewUsedIngredient {
                food_id: insert.food_id,
                name: &insert.name,
                calories: insert.calories,
                quantity: insert.quantity,
            })
            .execute(connection)?;
    }

    for insert in &plan.food_inserts {
        let food = diesel::insert_into(foods::table)
            .values(NewFood {
                cooking_id,
                recipe_id: insert.recipe_id,
                name: &insert.name,
                quantity: insert.quantity,
            })
            .returning(Food::as_returning())
            .get_result(connection)?;

        let lines = insert
            .used_ingredients
            .iter()
            .map(|seed| NewUsedIngredient {
                food_id: food.id,
                name: &seed.name,
                calories: seed.calories,
                quantity: seed.quantity,
            })
            .collect_vec();

        diesel::insert_into(used_ingredients::table)
            .values(&lines)
            .execute(connection)?;
    }

    Ok(())
}
