use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
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
            ingredient::Ingredient,
            recipe::{NewRecipe, Recipe},
            recipe_ingredient::RecipeIngredient,
        },
    },
    error::{Error, Result},
};

#[derive(Validate, Debug, Clone)]
pub struct RecipeInput {
    /// `None` creates, `Some` updates in place.
    pub id: Option<i32>,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    /// Treated as a set; order carries no meaning.
    pub ingredient_ids: Vec<i32>,
}

#[derive(Debug)]
pub struct RecipeWithIngredients {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

/// Recipes are templates, not snapshots: they hold references into
/// the catalog and get copied only when a cooking is created.
#[derive(AllArgsConstructor)]
pub struct Recipes {
    pool: PgPool,
}

impl Recipes {
    pub fn upsert(&self, _caller: &Caller, input: &RecipeInput) -> Result<Recipe> {
        input.validate()?;

        let span = trace_span!("upserting recipe");
        let _guard = span.enter();

        let ingredient_ids = input.ingredient_ids.iter().copied().unique().collect_vec();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::{recipe_ingredients, recipes};

            let recipe = match input.id {
                Some(recipe_id) => diesel::update(recipes::table.find(recipe_id))
                    .set((
                        recipes::name.eq(&input.name),
                        recipes::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(Recipe::as_returning())
                    .get_result(connection)
                    .optional()
                    .map_err(Error::on_unique_name(&input.name))?
                    .ok_or(Error::NotFound("recipe"))?,
                None => diesel::insert_into(recipes::table)
                    .values(NewRecipe { name: &input.name })
                    .returning(Recipe::as_returning())
                    .get_result(connection)
                    .map_err(Error::on_unique_name(&input.name))?,
            };

            // Reconcile the link rows against the submitted set: drop
            // the ones that left, add the ones that arrived. Re-adding
            // an existing pair is a no-op.
            diesel::delete(
                recipe_ingredients::table
                    .filter(recipe_ingredients::recipe_id.eq(recipe.id))
                    .filter(recipe_ingredients::ingredient_id.ne_all(&ingredient_ids)),
            )
            .execute(connection)?;

            let links = ingredient_ids
                .iter()
                .map(|&ingredient_id| RecipeIngredient::new(recipe.id, ingredient_id))
                .collect_vec();

            diesel::insert_into(recipe_ingredients::table)
                .values(&links)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(|error| match error {
                    diesel::result::Error::DatabaseError(
                        DatabaseErrorKind::ForeignKeyViolation,
                        _,
                    ) => Error::NotFound("ingredient"),
                    other => Error::Database(other),
                })?;

            Ok(recipe)
        })
    }

    /// Case-insensitive substring search, most recently updated first.
    pub fn search(&self, _caller: &Caller, name_part: &str) -> Result<Vec<Recipe>> {
        use crate::database::schema::recipes;

        let span = trace_span!("searching recipes");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let found = recipes::table
            .filter(recipes::name.ilike(format!("%{name_part}%")))
            .order(recipes::updated_at.desc())
            .limit(SEARCH_PAGE_SIZE)
            .select(Recipe::as_select())
            .load(&mut connection)?;

        Ok(found)
    }

    pub fn get_by_id(&self, _caller: &Caller, recipe_id: i32) -> Result<RecipeWithIngredients> {
        use crate::database::schema::recipes;

        let span = trace_span!("loading recipe");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let recipe = recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(&mut connection)
            .optional()?
            .ok_or(Error::NotFound("recipe"))?;

        let ingredients = recipe.ingredients(&mut connection)?;

        Ok(RecipeWithIngredients {
            recipe,
            ingredients,
        })
    }

    /// The ingredient list a cooking is seeded from, name ascending.
    pub fn get_ingredients(&self, _caller: &Caller, recipe_id: i32) -> Result<Vec<Ingredient>> {
        use crate::database::schema::recipes;

        let span = trace_span!("loading recipe ingredients");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let recipe = recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(&mut connection)
            .optional()?
            .ok_or(Error::NotFound("recipe"))?;

        Ok(recipe.ingredients(&mut connection)?)
    }

    /// Removes the recipe and its links. Foods created from it in past
    /// cookings keep their `recipe_id` and stay untouched.
    pub fn delete(&self, _caller: &Caller, recipe_id: i32) -> Result<()> {
        let span = trace_span!("deleting recipe");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::{recipe_ingredients, recipes};

            diesel::delete(
                recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
            )
            .execute(connection)?;

            let deleted = diesel::delete(recipes::table.find(recipe_id)).execute(connection)?;

            if deleted == 0 {
                return Err(Error::NotFound("recipe"));
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_short_name() {
        let input = RecipeInput {
            id: None,
            name: "A".to_owned(),
            ingredient_ids: vec![1, 2],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn an_empty_ingredient_set_is_valid() {
        let input = RecipeInput {
            id: None,
            name: "Apple pie".to_owned(),
            ingredient_ids: vec![],
        };
        assert!(input.validate().is_ok());
    }
}
