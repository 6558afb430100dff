use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod players;

pub use players::SqlitePlayerRepository;

const PLAYERS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS jogadores (id INTEGER PRIMARY KEY AUTOINCREMENT, nome TEXT NOT NULL, email TEXT NOT NULL, telefone TEXT NOT NULL, codinome TEXT NOT NULL UNIQUE, grupo TEXT NOT NULL);";

fn create_player_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("JOGADORES_DB").expect("JOGADORES_DB env var not set");

    let conn_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(conn_options)
}

pub async fn create_schema(pool: &Pool<Sqlite>) -> sqlx::Result<()> {
    sqlx::query(PLAYERS_TABLE_SQL).execute(pool).await?;
    Ok(())
}
