use diesel::prelude::*;
use lombok::AllArgsConstructor;

use super::food::Food;

/// One cooking session. Owns its foods; deleting a cooking takes the
/// foods and their used ingredients with it.
#[derive(Queryable, Selectable, Identifiable, AllArgsConstructor, Debug, Clone)]
#[diesel(table_name = crate::database::schema::cookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Cooking {
    pub id: i32,
    pub name: String,
}

impl Cooking {
    /// Foods in insertion order.
    pub fn foods(&self, connection: &mut PgConnection) -> QueryResult<Vec<Food>> {
        use crate::database::schema::foods;

        foods::table
            .filter(foods::cooking_id.eq(self.id))
            .select(Food::as_select())
            .order(foods::id.asc())
            .load(connection)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::database::schema::cookings)]
pub struct NewCooking<'a> {
    pub name: &'a str,
}
