use diesel::prelude::*;
use lombok::AllArgsConstructor;

use super::food::Food;

/// Name and calories are copied from the catalog when the row is
/// created. Later catalog edits must not reach back into a cooking,
/// so there is no foreign key to `ingredients`.
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    AllArgsConstructor,
    Debug,
    PartialEq,
    Eq,
    Clone,
)]
#[diesel(table_name = crate::database::schema::used_ingredients)]
#[diesel(belongs_to(Food))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UsedIngredient {
    pub id: i32,
    pub food_id: i32,
    pub name: String,
    pub calories: i32,
    pub quantity: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::used_ingredients)]
pub struct NewUsedIngredient<'a> {
    pub food_id: i32,
    pub name: &'a str,
    pub calories: i32,
    pub quantity: i32,
}
