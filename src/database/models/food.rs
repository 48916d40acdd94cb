use diesel::prelude::*;
use lombok::AllArgsConstructor;

/// One cooked item. `recipe_id` is provenance only: it records which
/// recipe seeded this food and is never re-validated afterwards. Used
/// ingredients are always loaded for a whole cooking at once, via
/// `belonging_to` on the food batch.
#[derive(Queryable, Selectable, Identifiable, AllArgsConstructor, Debug, Clone)]
#[diesel(table_name = crate::database::schema::foods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Food {
    pub id: i32,
    pub cooking_id: i32,
    pub recipe_id: i32,
    pub name: String,
    pub quantity: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::foods)]
pub struct NewFood<'a> {
    pub cooking_id: i32,
    pub recipe_id: i32,
    pub name: &'a str,
    pub quantity: i32,
}
