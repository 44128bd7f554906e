//! Ticket inventory ledger. Quantity only ever moves through [`reserve`] and
//! [`refund`], always inside a unit of work owned by the calling component.

use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::models::Ticket;

/// Decrements remaining quantity by `quantity` after checking stock. Returns
/// the ticket row as it was before the decrement so the caller can reach the
/// event and price without a second read.
pub async fn reserve(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    quantity: i64,
) -> Result<Ticket, EngineError> {
    if quantity <= 0 {
        return Err(EngineError::Validation(
            "quantity must be a positive integer".to_string(),
        ));
    }

    let ticket = sqlx::query_as::<_, Ticket>(
        "SELECT id, event_id, ticket_type, price, quantity FROM tickets WHERE id = ?",
    )
    .bind(ticket_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(EngineError::NotFound("ticket"))?;

    if quantity > ticket.quantity {
        return Err(EngineError::InsufficientInventory {
            remaining: ticket.quantity,
        });
    }

    sqlx::query("UPDATE tickets SET quantity = quantity - ? WHERE id = ?")
        .bind(quantity)
        .bind(ticket_id)
        .execute(&mut *conn)
        .await?;

    Ok(ticket)
}

/// Returns `units` to the ticket's remaining quantity. The ledger does not
/// check an upper bound; callers pair every refund with a prior reservation.
pub async fn refund(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    units: i64,
) -> Result<(), EngineError> {
    sqlx::query("UPDATE tickets SET quantity = quantity + ? WHERE id = ?")
        .bind(units)
        .bind(ticket_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
