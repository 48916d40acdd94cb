use diesel::prelude::*;
use lombok::AllArgsConstructor;

#[derive(
    Queryable,
    Selectable,
    Insertable,
    AllArgsConstructor,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
)]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
}
