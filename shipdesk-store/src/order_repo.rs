use async_trait::async_trait;
use shipdesk_order::{Order, OrderRepository, StoreError};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::error;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, id: &str) -> Result<Option<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT version FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    version: i64,
    body: Json<Order>,
}

impl OrderRow {
    /// The column is authoritative; the copy inside the body is whatever
    /// the writer held before the bump.
    fn into_order(self) -> Order {
        let mut order = self.body.0;
        order.version = self.version;
        order
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    error!("Order store query failed: {}", err);
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT version, body FROM orders ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(OrderRow::into_order).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT version, body FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(row.map(OrderRow::into_order))
    }

    async fn upsert(&self, order: &Order) -> Result<Order, StoreError> {
        let written = if order.version == 0 {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO orders (id, version, body, created_at, updated_at)
                VALUES ($1, 1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                RETURNING version
                "#,
            )
            .bind(&order.id)
            .bind(Json(order))
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
        } else {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE orders
                SET version = version + 1, body = $3, updated_at = $4
                WHERE id = $1 AND version = $2
                RETURNING version
                "#,
            )
            .bind(&order.id)
            .bind(order.version)
            .bind(Json(order))
            .bind(order.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
        };

        match written {
            Some(version) => {
                let mut stored = order.clone();
                stored.version = version;
                Ok(stored)
            }
            None => match self.current_version(&order.id).await? {
                Some(found) => Err(StoreError::VersionConflict {
                    id: order.id.clone(),
                    expected: order.version,
                    found,
                }),
                None => Err(StoreError::NotFound(order.id.clone())),
            },
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
