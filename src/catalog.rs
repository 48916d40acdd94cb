use diesel::prelude::*;
use lombok::AllArgsConstructor;
use tracing::trace_span;
use validator::Validate;

use crate::{
    auth::Caller,
    database::{
        connection::PgPool,
        models::ingredient::{Ingredient, NewIngredient},
    },
    error::{Error, Result},
};

/// One page of search results, newest updated first.
pub const SEARCH_PAGE_SIZE: i64 = 10;

#[derive(Validate, Debug, Clone)]
pub struct IngredientInput {
    /// `None` creates, `Some` updates in place.
    pub id: Option<i32>,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "calories must not be negative"))]
    pub calories: i32,
}

/// The ingredient catalog. CRUD only; recipes and cookings reference
/// or copy these rows but never the other way around.
#[derive(AllArgsConstructor)]
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    pub fn upsert(&self, _caller: &Caller, input: &IngredientInput) -> Result<Ingredient> {
        input.validate()?;

        let span = trace_span!("upserting ingredient");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::ingredients::dsl::*;

            match input.id {
                Some(ingredient_id) => diesel::update(ingredients.find(ingredient_id))
                    .set((
                        name.eq(&input.name),
                        calories.eq(input.calories),
                        updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(Ingredient::as_returning())
                    .get_result(connection)
                    .optional()
                    .map_err(Error::on_unique_name(&input.name))?
                    .ok_or(Error::NotFound("ingredient")),
                None => diesel::insert_into(ingredients)
                    .values(NewIngredient {
                        name: &input.name,
                        calories: input.calories,
                    })
                    .returning(Ingredient::as_returning())
                    .get_result(connection)
                    .map_err(Error::on_unique_name(&input.name)),
            }
        })
    }

    /// Case-insensitive substring search, most recently updated first.
    pub fn search(&self, _caller: &Caller, name_part: &str) -> Result<Vec<Ingredient>> {
        use crate::database::schema::ingredients;

        let span = trace_span!("searching ingredients");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        let found = ingredients::table
            .filter(ingredients::name.ilike(format!("%{name_part}%")))
            .order(ingredients::updated_at.desc())
            .limit(SEARCH_PAGE_SIZE)
            .select(Ingredient::as_select())
            .load(&mut connection)?;

        Ok(found)
    }

    /// Removes the row and any recipe links that reference it. Rows
    /// already snapshotted into `used_ingredients` keep their copies.
    pub fn delete(&self, _caller: &Caller, ingredient_id: i32) -> Result<()> {
        let span = trace_span!("deleting ingredient");
        let _guard = span.enter();

        let mut connection = self.pool.get()?;

        connection.transaction(|connection| {
            use crate::database::schema::{ingredients, recipe_ingredients};

            diesel::delete(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq(ingredient_id)),
            )
            .execute(connection)?;

            let deleted =
                diesel::delete(ingredients::table.find(ingredient_id)).execute(connection)?;

            if deleted == 0 {
                return Err(Error::NotFound("ingredient"));
            }

            Ok(())
        })
    }
}
