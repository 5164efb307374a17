use async_trait::async_trait;
use chrono::{DateTime, Utc};
use posbridge_order::models::{Charges, Customer, DeliveryTracking, OrderItem, TaxLine, Totals};
use posbridge_order::{Order, OrderRepository, RepoError, SyncRecord};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_COLUMNS: &str = "id, order_number, restaurant_id, restaurant_name, external_order_id, \
    customer, order_type, payment_type, table_no, persons, notes, items, taxes, charges, totals, \
    status, sync_status, sync_error, synced_at, tracking, is_deleted, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    restaurant_id: String,
    restaurant_name: String,
    external_order_id: Option<String>,
    customer: Json<Customer>,
    order_type: String,
    payment_type: String,
    table_no: Option<String>,
    persons: Option<i32>,
    notes: Option<String>,
    items: Json<Vec<OrderItem>>,
    taxes: Json<Vec<TaxLine>>,
    charges: Json<Charges>,
    totals: Json<Totals>,
    status: String,
    sync_status: Option<String>,
    sync_error: Option<String>,
    synced_at: Option<DateTime<Utc>>,
    tracking: Json<DeliveryTracking>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let sync = match (row.sync_status, row.synced_at) {
            (Some(status), Some(attempted_at)) => Some(SyncRecord {
                status: status.parse()?,
                error: row.sync_error,
                attempted_at,
            }),
            (None, None) => None,
            _ => return Err(format!("order {} has a partial sync record", row.id).into()),
        };
        let persons = row
            .persons
            .map(u32::try_from)
            .transpose()
            .map_err(|_| format!("order {} has a negative party size", row.id))?;

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            restaurant_id: row.restaurant_id,
            restaurant_name: row.restaurant_name,
            external_order_id: row.external_order_id,
            customer: row.customer.0,
            order_type: row.order_type.parse()?,
            payment_type: row.payment_type,
            table_no: row.table_no,
            persons,
            notes: row.notes,
            items: row.items.0,
            taxes: row.taxes.0,
            charges: row.charges.0,
            totals: row.totals.0,
            status: row.status.parse()?,
            sync,
            tracking: row.tracking.0,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn sync_columns(sync: Option<&SyncRecord>) -> (Option<&'static str>, Option<String>, Option<DateTime<Utc>>) {
    match sync {
        Some(s) => (Some(s.status.as_str()), s.error.clone(), Some(s.attempted_at)),
        None => (None, None, None),
    }
}

fn persons_column(order: &Order) -> Result<Option<i32>, RepoError> {
    order
        .persons
        .map(i32::try_from)
        .transpose()
        .map_err(|_| format!("order {} party size out of range", order.id).into())
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, order: &Order) -> Result<Uuid, RepoError> {
        let (sync_status, sync_error, synced_at) = sync_columns(order.sync.as_ref());
        let persons = persons_column(order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, restaurant_id, restaurant_name, external_order_id,
                customer, order_type, payment_type, table_no, persons, notes, items, taxes, charges,
                totals, total_paise, status, sync_status, sync_error, synced_at, tracking, is_deleted,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.restaurant_id)
        .bind(&order.restaurant_name)
        .bind(&order.external_order_id)
        .bind(Json(&order.customer))
        .bind(order.order_type.as_str())
        .bind(&order.payment_type)
        .bind(&order.table_no)
        .bind(persons)
        .bind(&order.notes)
        .bind(Json(&order.items))
        .bind(Json(&order.taxes))
        .bind(Json(&order.charges))
        .bind(Json(&order.totals))
        .bind(order.totals.total)
        .bind(order.status.as_str())
        .bind(sync_status)
        .bind(sync_error)
        .bind(synced_at)
        .bind(Json(&order.tracking))
        .bind(order.is_deleted)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order.id)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND is_deleted = FALSE",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_external_id(
        &self,
        restaurant_id: &str,
        external_order_id: &str,
    ) -> Result<Option<Order>, RepoError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE restaurant_id = $1 AND external_order_id = $2 AND is_deleted = FALSE",
            ORDER_COLUMNS
        ))
        .bind(restaurant_id)
        .bind(external_order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn update_order(&self, order: &Order) -> Result<(), RepoError> {
        let (sync_status, sync_error, synced_at) = sync_columns(order.sync.as_ref());

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET external_order_id = $2, status = $3, sync_status = $4, sync_error = $5,
                synced_at = $6, tracking = $7, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(order.id)
        .bind(&order.external_order_id)
        .bind(order.status.as_str())
        .bind(sync_status)
        .bind(sync_error)
        .bind(synced_at)
        .bind(Json(&order.tracking))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("order {} not found", order.id).into());
        }
        Ok(())
    }

    async fn record_sync(&self, id: Uuid, record: &SyncRecord) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET sync_status = $2, sync_error = $3, synced_at = $4, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(record.status.as_str())
        .bind(&record.error)
        .bind(record.attempted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("order {} not found", id).into());
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE orders SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
