//! Purchase coordinator: inventory decrement, order rows and the buyer's
//! registration commit together or not at all.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::engine::ledger;
use crate::models::PaymentStatus;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub ticket_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    pub event_id: i64,
    pub order_ids: Vec<i64>,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub registered: bool,
}

pub async fn purchase(
    store: &Store,
    req: &PurchaseRequest,
) -> Result<PurchaseOutcome, EngineError> {
    if req.quantity <= 0 {
        return Err(EngineError::Validation(
            "you must order at least 1 ticket".to_string(),
        ));
    }

    let mut uow = store.begin().await?;
    match run(uow.conn(), req).await {
        Ok(outcome) => {
            uow.commit().await?;
            tracing::info!(
                ticket_id = req.ticket_id,
                buyer_id = req.buyer_id,
                quantity = req.quantity,
                registered = outcome.registered,
                "purchase committed"
            );
            Ok(outcome)
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run(
    conn: &mut SqliteConnection,
    req: &PurchaseRequest,
) -> Result<PurchaseOutcome, EngineError> {
    let ticket = ledger::reserve(conn, req.ticket_id, req.quantity).await?;

    let payment_status = if req.paid {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Pending
    };

    // One row per purchased unit, all stamped with the same order time.
    let ordered_at = Utc::now();
    let mut order_ids = Vec::with_capacity(req.quantity as usize);
    for _ in 0..req.quantity {
        let id = sqlx::query(
            "INSERT INTO orders (ticket_id, user_id, ordered_at, payment_status) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(req.ticket_id)
        .bind(req.buyer_id)
        .bind(ordered_at)
        .bind(payment_status)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        order_ids.push(id);
    }

    // A completed payment registers the buyer exactly once, no matter how
    // many units were purchased.
    let mut registered = false;
    if req.paid {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = ? AND user_id = ?",
        )
        .bind(ticket.event_id)
        .bind(req.buyer_id)
        .fetch_one(&mut *conn)
        .await?;
        if existing > 0 {
            return Err(EngineError::DuplicateRegistration);
        }

        sqlx::query(
            "INSERT INTO event_participants (event_id, user_id, registered_at, attended) \
             VALUES (?, ?, ?, 0)",
        )
        .bind(ticket.event_id)
        .bind(req.buyer_id)
        .bind(ordered_at)
        .execute(&mut *conn)
        .await?;
        registered = true;
    }

    Ok(PurchaseOutcome {
        event_id: ticket.event_id,
        order_ids,
        total_price: ticket.price * req.quantity as f64,
        payment_status,
        registered,
    })
}
