//! Order placement and back-office order management.
//!
//! Placing an order writes one `orders` row and one `order_items` row per
//! line item inside a single transaction. Either every row commits or none
//! does; no reader ever observes a header without its items.

use std::fmt;
use std::str::FromStr;

use sea_orm::prelude::{Decimal, Uuid};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::auth::AdminId;
use crate::clock;
use crate::entity::order::{self, Entity as OrderEntity};
use crate::entity::order_item::{self, Entity as OrderItemEntity};
use crate::entity::product::{self, Entity as ProductEntity};
use crate::error::{Error, Result};

/// Lifecycle state of an order.
///
/// Any state may follow any other; only membership in this set is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// `completed` and `cancelled` end the normal flow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::validation("Invalid status"))
    }
}

/// Whether placing an order also draws down product stock.
///
/// Off by default. When on, each line item whose product still exists
/// decrements its `stock_quantity` inside the order transaction, and an
/// item asking for more than is left aborts the whole order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPolicy {
    pub decrement_stock: bool,
}

/// A customer submission as received.
///
/// Header fields are checked by [`OrderInput::validate`]. Line item fields
/// are passed to the store untouched; its NOT NULL and CHECK constraints
/// reject bad items, which aborts the transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub items: Option<Vec<LineItemInput>>,
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One submitted line item: a snapshot of the product at order time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub product_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub subtotal: Option<Decimal>,
}

/// An order whose header passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub total_amount: Decimal,
    pub notes: String,
    pub items: Vec<LineItemInput>,
}

impl OrderInput {
    /// Checks the header and the presence of items without any I/O.
    pub fn validate(self) -> Result<NewOrder> {
        fn required(value: Option<String>) -> Result<String> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::validation("Missing required fields"))
        }

        let customer_name = required(self.customer_name)?;
        let customer_email = required(self.customer_email)?;
        let customer_phone = required(self.customer_phone)?;
        let delivery_address = required(self.delivery_address)?;

        let items = self
            .items
            .filter(|items| !items.is_empty())
            .ok_or_else(|| Error::validation("Missing required fields"))?;

        // A zero total counts as absent.
        let total_amount = self
            .total_amount
            .filter(|total| !total.is_zero())
            .ok_or_else(|| Error::validation("Missing required fields"))?;
        if total_amount < Decimal::ZERO {
            return Err(Error::validation("Total amount must not be negative"));
        }

        Ok(NewOrder {
            customer_name,
            customer_email,
            customer_phone,
            delivery_address,
            total_amount,
            notes: self.notes.unwrap_or_default(),
            items,
        })
    }
}

/// Order service over the `orders` and `order_items` tables.
#[derive(Debug, Clone)]
pub struct OrderService {
    conn: DatabaseConnection,
    policy: OrderPolicy,
}

impl OrderService {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            policy: OrderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persists an order header and all its line items atomically.
    ///
    /// Validation failures return before a connection is taken. Any store
    /// failure after `BEGIN` rolls the transaction back and is returned
    /// as-is; nothing is retried here.
    pub async fn place_order(&self, input: OrderInput) -> Result<Uuid> {
        let order = input.validate()?;
        let item_count = order.items.len();

        let txn = self.conn.begin().await?;

        match self.write_order(&txn, order).await {
            Ok(order_id) => {
                txn.commit().await?;
                info!(%order_id, items = item_count, "order placed");
                Ok(order_id)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "order rollback failed");
                }
                error!(error = %e, items = item_count, "order placement rolled back");
                Err(e)
            }
        }
    }

    async fn write_order(&self, txn: &DatabaseTransaction, order: NewOrder) -> Result<Uuid> {
        let order_id = Uuid::new_v4();

        order::ActiveModel {
            id: Set(order_id),
            customer_name: Set(order.customer_name),
            customer_email: Set(order.customer_email),
            customer_phone: Set(order.customer_phone),
            delivery_address: Set(order.delivery_address),
            total_amount: Set(order.total_amount),
            status: Set(OrderStatus::Pending.as_str().to_owned()),
            notes: Set(order.notes),
            created_at: Set(clock::now()),
        }
        .insert(txn)
        .await?;

        for (position, item) in order.items.into_iter().enumerate() {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: supplied(item.product_id),
                product_name: supplied(item.product_name),
                product_price: supplied(item.product_price),
                quantity: supplied(item.quantity),
                subtotal: supplied(item.subtotal),
                position: Set(position as i32),
            }
            .insert(txn)
            .await?;

            if self.policy.decrement_stock {
                draw_down_stock(txn, &item).await?;
            }
        }

        Ok(order_id)
    }

    /// Sets the status of an order.
    ///
    /// The status string is checked against [`OrderStatus`] before the
    /// store is touched. An unknown `order_id` changes nothing and is not
    /// an error.
    pub async fn update_status(&self, admin: AdminId, order_id: Uuid, status: &str) -> Result<()> {
        let status: OrderStatus = status.parse()?;

        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.as_str()))
            .filter(order::Column::Id.eq(order_id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            debug!(%order_id, %status, "status update matched no order");
        } else {
            info!(
                %order_id,
                %status,
                terminal = status.is_terminal(),
                %admin,
                "order status updated"
            );
        }
        Ok(())
    }

    /// All orders, newest first.
    pub async fn list_all(&self, _admin: AdminId) -> Result<Vec<order::Model>> {
        Ok(OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.conn)
            .await?)
    }

    /// Line items of an order in submission order. Unknown orders have none.
    pub async fn get_items(&self, _admin: AdminId, order_id: Uuid) -> Result<Vec<order_item::Model>> {
        Ok(OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Position)
            .all(&self.conn)
            .await?)
    }
}

fn supplied<T>(value: Option<T>) -> ActiveValue<T>
where
    T: Into<sea_orm::Value>,
{
    match value {
        Some(value) => Set(value),
        None => ActiveValue::NotSet,
    }
}

async fn draw_down_stock<C>(conn: &C, item: &order_item::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).sub(item.quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(clock::now()))
        .filter(product::Column::Id.eq(item.product_id))
        .filter(product::Column::StockQuantity.gte(item.quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0
        && ProductEntity::find_by_id(item.product_id)
            .one(conn)
            .await?
            .is_some()
    {
        return Err(Error::validation(format!(
            "Insufficient stock for {}",
            item.product_name
        )));
    }
    Ok(())
}
