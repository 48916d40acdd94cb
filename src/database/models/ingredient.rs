use diesel::prelude::*;
use lombok::AllArgsConstructor;

/// Catalog entry: calories are per 100g. Ordering lives in the
/// queries, not here.
#[derive(Queryable, Selectable, Identifiable, AllArgsConstructor, Debug, Clone)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub calories: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
    pub calories: i32,
}
