//! Cancellation reversor: undoes a registration, removes the buyer's orders
//! for the event, and restores ticket inventory as one atomic unit.

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::engine::ledger;
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    pub orders_removed: i64,
    pub units_refunded: i64,
}

pub async fn cancel_registration(
    store: &Store,
    event_id: i64,
    user_id: i64,
) -> Result<CancelOutcome, EngineError> {
    let mut uow = store.begin().await?;
    match run(uow.conn(), event_id, user_id).await {
        Ok(outcome) => {
            uow.commit().await?;
            tracing::info!(
                event_id,
                user_id,
                units_refunded = outcome.units_refunded,
                "registration cancelled"
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
    event_id: i64,
    user_id: i64,
) -> Result<CancelOutcome, EngineError> {
    let deleted =
        sqlx::query("DELETE FROM event_participants WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    if deleted.rows_affected() == 0 {
        return Err(EngineError::NotRegistered);
    }

    // Refunds follow purchase lineage: each removed order returns one unit to
    // the ticket it was placed against.
    let lots = sqlx::query_as::<_, (i64, i64)>(
        "SELECT ticket_id, COUNT(*) FROM orders \
         WHERE user_id = ? AND ticket_id IN (SELECT id FROM tickets WHERE event_id = ?) \
         GROUP BY ticket_id",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await?;

    let removed = sqlx::query(
        "DELETE FROM orders \
         WHERE user_id = ? AND ticket_id IN (SELECT id FROM tickets WHERE event_id = ?)",
    )
    .bind(user_id)
    .bind(event_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let mut units_refunded = 0;
    for (ticket_id, units) in &lots {
        ledger::refund(conn, *ticket_id, *units).await?;
        units_refunded += units;
    }

    Ok(CancelOutcome {
        orders_removed: removed as i64,
        units_refunded,
    })
}
