use diesel::prelude::*;
use lombok::AllArgsConstructor;

use super::ingredient::Ingredient;

#[derive(Queryable, Selectable, Identifiable, AllArgsConstructor, Debug, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: i32,
    pub name: String,
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Recipe {}

impl Recipe {
    /// Linked catalog ingredients, name ascending. This is the
    /// canonical order used when the recipe seeds a cooking.
    pub fn ingredients(&self, connection: &mut PgConnection) -> QueryResult<Vec<Ingredient>> {
        use crate::database::schema::{ingredients, recipe_ingredients};

        recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(self.id))
            .select(Ingredient::as_select())
            .order(ingredients::name.asc())
            .load(connection)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct NewRecipe<'a> {
    pub name: &'a str,
}
