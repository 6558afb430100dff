use jogadores_domain::{
    ServiceError, ServiceResult,
    page::{Page, PageRequest, SortOrder},
    player::{Player, PlayerField, PlayerFilter, PlayerId, PlayerRepository, PlayerSortBy},
};
use log::error;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{create_player_db_pool, create_schema};

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePlayerRepository {
    pub fn new() -> Self {
        let pool = create_player_db_pool();
        Self { pool }
    }

    pub fn with_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> ServiceResult<()> {
        create_schema(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    fn player_from_row(row: &SqliteRow) -> sqlx::Result<Player> {
        Ok(Player {
            id: Some(row.try_get("id")?),
            name: row.try_get("nome")?,
            email: row.try_get("email")?,
            phone: row.try_get("telefone")?,
            codename: row.try_get("codinome")?,
            group: row.try_get("grupo")?,
        })
    }

    fn column(field: PlayerField) -> &'static str {
        match field {
            PlayerField::Name => "nome",
            PlayerField::Email => "email",
            PlayerField::Phone => "telefone",
            PlayerField::Codename => "codinome",
            PlayerField::Group => "grupo",
        }
    }

    fn where_clause(filter: &PlayerFilter) -> (String, Vec<&str>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        for (field, value) in filter.predicates() {
            conditions.push(format!(
                "instr(lower({}), lower(?)) > 0",
                Self::column(field)
            ));
            params.push(value);
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }

    fn order_clause(page_request: &PageRequest) -> String {
        let Some(sort) = page_request.sort() else {
            return "id ASC".to_string();
        };
        let direction = match sort.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        match sort.property {
            PlayerSortBy::Id => format!("id {}", direction),
            PlayerSortBy::Field(field) => {
                format!("{} {}, id ASC", Self::column(field), direction)
            }
        }
    }
}

fn to_sql_int(value: usize) -> ServiceResult<i64> {
    i64::try_from(value)
        .map_err(|_| ServiceError::BadRequest("Page number too large".to_string()))
}

fn map_write_error(e: sqlx::Error) -> ServiceError {
    if e
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
    {
        return ServiceError::DuplicateCodename;
    }
    error!("Player write failed: {}", e);
    ServiceError::Internal(e.to_string())
}

fn map_read_error(e: sqlx::Error) -> ServiceError {
    error!("Player query failed: {}", e);
    ServiceError::Internal(e.to_string())
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn insert_player(&self, player: &Player) -> ServiceResult<Player> {
        // Id is auto-incremented
        let res = sqlx::query(
            "INSERT INTO jogadores (nome, email, telefone, codinome, grupo) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&player.name)
        .bind(&player.email)
        .bind(&player.phone)
        .bind(&player.codename)
        .bind(&player.group)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(Player {
            id: Some(res.last_insert_rowid()),
            ..player.clone()
        })
    }

    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM jogadores WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;
        row.as_ref()
            .map(Self::player_from_row)
            .transpose()
            .map_err(map_read_error)
    }

    async fn exists_by_codename(&self, codename: &str) -> ServiceResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM jogadores WHERE codinome = ?",
        )
        .bind(codename)
        .fetch_one(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(count > 0)
    }

    async fn update_player(&self, player: &Player) -> ServiceResult<Player> {
        let Some(id) = player.id else {
            return ServiceError::invalid_argument(jogadores_domain::MISSING_PLAYER_ID_MESSAGE);
        };
        let res = sqlx::query(
            "UPDATE jogadores SET nome = ?, email = ?, telefone = ?, codinome = ?, grupo = ? WHERE id = ?",
        )
        .bind(&player.name)
        .bind(&player.email)
        .bind(&player.phone)
        .bind(&player.codename)
        .bind(&player.group)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if res.rows_affected() == 0 {
            return ServiceError::not_found(format!("Player {} not found", id));
        }
        Ok(player.clone())
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()> {
        sqlx::query("DELETE FROM jogadores WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_players(
        &self,
        filter: &PlayerFilter,
        page_request: &PageRequest,
    ) -> ServiceResult<Page<Player>> {
        let (where_sql, params) = Self::where_clause(filter);
        let limit = to_sql_int(page_request.size())?;
        let offset = to_sql_int(page_request.offset())?;

        let count_sql = format!("SELECT COUNT(*) FROM jogadores{}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &params {
            count_query = count_query.bind(*value);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)?;

        let select_sql = format!(
            "SELECT * FROM jogadores{} ORDER BY {} LIMIT ? OFFSET ?",
            where_sql,
            Self::order_clause(page_request)
        );
        let mut query = sqlx::query(&select_sql);
        for value in &params {
            query = query.bind(*value);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)?;

        let players = rows
            .iter()
            .map(Self::player_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(map_read_error)?;

        Ok(Page::new(players, *page_request, total as usize))
    }
}
