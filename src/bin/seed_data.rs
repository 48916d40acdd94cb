#![warn(clippy::all)]

use std::collections::HashMap;

use calorie_counting::database::connection::establish_pooled_connection;
use calorie_counting::database::models::{
    ingredient::{Ingredient, NewIngredient},
    recipe::{NewRecipe, Recipe},
    recipe_ingredient::RecipeIngredient,
};
use diesel::{insert_into, PgConnection, QueryResult, RunQueryDsl, SelectableHelper};
use serde_json::{from_str, Value};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

/// Loads the starter catalog (ingredients + recipes) into an empty
/// database, all inside one transaction.
fn main() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let _subscriber = Registry::default()
        .with(stdout_log)
        .with(LevelFilter::from_level(Level::INFO));

    tracing::subscriber::set_global_default(_subscriber).expect("Unable to set global subscriber");

    let pool = establish_pooled_connection();
    let mut connection = pool.get().expect("Failed to get a connection from the pool");

    connection
        .build_transaction()
        .run(|connection| {
            let catalog: Value = from_str(include_str!("../resources/json/catalog.json"))
                .expect("Can't parse catalog fixtures");

            let ingredient_ids = fill_ingredients(connection, &catalog);
            fill_recipes(connection, &catalog, &ingredient_ids);

            QueryResult::Ok(())
        })
        .unwrap();
}

fn fill_ingredients(connection: &mut PgConnection, catalog: &Value) -> HashMap<String, i32> {
    use calorie_counting::database::schema::ingredients;

    tracing::info!("Starting fill_ingredients");

    let mut ids = HashMap::new();

    for entry in catalog["ingredients"].as_array().unwrap() {
        let name = entry["name"].as_str().unwrap();
        let calories = entry["calories"].as_i64().unwrap() as i32;

        let row: Ingredient = insert_into(ingredients::table)
            .values(NewIngredient { name, calories })
            .returning(Ingredient::as_returning())
            .get_result(connection)
            .unwrap();

        ids.insert(name.to_owned(), row.id);
    }

    tracing::info!("End fill_ingredients");

    ids
}

fn fill_recipes(
    connection: &mut PgConnection,
    catalog: &Value,
    ingredient_ids: &HashMap<String, i32>,
) {
    use calorie_counting::database::schema::{recipe_ingredients, recipes};

    tracing::info!("Starting fill_recipes");

    for entry in catalog["recipes"].as_array().unwrap() {
        let name = entry["name"].as_str().unwrap();

        let recipe: Recipe = insert_into(recipes::table)
            .values(NewRecipe { name })
            .returning(Recipe::as_returning())
            .get_result(connection)
            .unwrap();

        let links: Vec<RecipeIngredient> = entry["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|ingredient_name| {
                let ingredient_name = ingredient_name.as_str().unwrap();
                RecipeIngredient::new(recipe.id, ingredient_ids[ingredient_name])
            })
            .collect();

        insert_into(recipe_ingredients::table)
            .values(&links)
            .execute(connection)
            .unwrap();
    }

    tracing::info!("End fill_recipes");
}
