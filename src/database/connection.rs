use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use dotenvy::dotenv;
use std::env;
use tracing::{trace, trace_span};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the process-wide pool. Services receive it at construction;
/// nothing else in the crate touches `DATABASE_URL`.
pub fn establish_pooled_connection() -> PgPool {
    let span = trace_span!("establishing pooled connection");
    let _guard = span.enter();

    dotenv().ok();

    trace!("Loading database_url");
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    trace!("Creating manager");
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    trace!("Creating pool");
    Pool::builder()
        .build(manager)
        .expect("Failed to create pool.")
}
