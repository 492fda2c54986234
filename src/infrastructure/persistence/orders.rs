use crate::domain::entities::{NewOrder, Order, OrderStatus};
use crate::domain::ports::order_repository::{OrderDecision, OrderRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{inserted_id, nullable, Database};
use crate::shared::utils::to_rfc3339;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const ORDER_COLUMNS: &str = "id, order_no, enquiry_id, salesman_id, customer_name, product_name,
     quantity, unit_price, discount_percent, discount_amount, total_amount, status,
     invoice_number, rejection_reason, approved_by, decided_at, notes, created_at, updated_at";

fn order_from_row(row: &AnyRow) -> ApiResult<Order> {
    let status: String = row.try_get("status")?;

    Ok(Order {
        id: row.try_get("id")?,
        order_no: row.try_get("order_no")?,
        enquiry_id: row.try_get("enquiry_id")?,
        salesman_id: nullable(row, "salesman_id")?,
        customer_name: row.try_get("customer_name")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        discount_percent: row.try_get("discount_percent")?,
        discount_amount: row.try_get("discount_amount")?,
        total_amount: row.try_get("total_amount")?,
        status: status.parse().map_err(ApiError::Internal)?,
        invoice_number: nullable(row, "invoice_number")?,
        rejection_reason: nullable(row, "rejection_reason")?,
        approved_by: nullable(row, "approved_by")?,
        decided_at: nullable(row, "decided_at")?,
        notes: nullable(row, "notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl OrderRepository for Database {
    async fn create_order(&self, order: &NewOrder) -> ApiResult<Order> {
        let now = to_rfc3339(chrono::Utc::now());

        let result = sqlx::query(
            "INSERT INTO orders (
                order_no, enquiry_id, salesman_id, customer_name, product_name, quantity,
                unit_price, discount_percent, discount_amount, total_amount, status, notes,
                created_at, updated_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?, ?)",
        )
        .bind(&order.order_no)
        .bind(order.enquiry_id)
        .bind(order.salesman_id)
        .bind(&order.customer_name)
        .bind(&order.product_name)
        .bind(order.quantity)
        .bind(order.unit_price)
        .bind(order.discount_percent)
        .bind(order.discount_amount)
        .bind(order.total_amount)
        .bind(&order.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Order {
            id: inserted_id(&result)?,
            order_no: order.order_no.clone(),
            enquiry_id: order.enquiry_id,
            salesman_id: order.salesman_id,
            customer_name: order.customer_name.clone(),
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            unit_price: order.unit_price,
            discount_percent: order.discount_percent,
            discount_amount: order.discount_amount,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            invoice_number: None,
            rejection_reason: None,
            approved_by: None,
            decided_at: None,
            notes: order.notes.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn get_order(&self, id: i64) -> ApiResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn get_order_by_enquiry(&self, enquiry_id: i64) -> ApiResult<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE enquiry_id = ? ORDER BY id DESC LIMIT 1",
            ORDER_COLUMNS
        ))
        .bind(enquiry_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_orders(
        &self,
        salesman_id: Option<i64>,
        status: Option<OrderStatus>,
    ) -> ApiResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders
             WHERE (? IS NULL OR salesman_id = ?)
               AND (? IS NULL OR status = ?)
             ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))
        .bind(salesman_id)
        .bind(salesman_id)
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn update_pending_order(
        &self,
        id: i64,
        order: &NewOrder,
        updated_at: &str,
    ) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE orders
             SET customer_name = ?, product_name = ?, quantity = ?, unit_price = ?,
                 discount_percent = ?, discount_amount = ?, total_amount = ?, notes = ?,
                 updated_at = ?
             WHERE id = ? AND status = 'PENDING'",
        )
        .bind(&order.customer_name)
        .bind(&order.product_name)
        .bind(order.quantity)
        .bind(order.unit_price)
        .bind(order.discount_percent)
        .bind(order.discount_amount)
        .bind(order.total_amount)
        .bind(&order.notes)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(
                "Order has already been decided".to_string(),
            ));
        }
        Ok(())
    }

    async fn decide_order(&self, id: i64, decision: &OrderDecision) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE orders
             SET status = ?, invoice_number = ?, rejection_reason = ?, approved_by = ?,
                 decided_at = ?, updated_at = ?
             WHERE id = ? AND status = 'PENDING'",
        )
        .bind(decision.status.as_str())
        .bind(&decision.invoice_number)
        .bind(&decision.rejection_reason)
        .bind(decision.approved_by)
        .bind(&decision.decided_at)
        .bind(&decision.decided_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_invoices_with_prefix(&self, prefix: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM orders WHERE invoice_number LIKE ?",
        )
        .bind(format!("{}%", prefix))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("count")?)
    }
}
