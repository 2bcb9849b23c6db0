//! Transaction operations

use rusqlite::{params, Row};

use super::Database;
use crate::error::Result;
use crate::models::{Transaction, TransactionDirection};

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let direction: String = row.get("direction")?;
    Ok(Transaction {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        file_id: row.get("file_id")?,
        date: row.get("date")?,
        description: row.get("description")?,
        merchant: row.get("merchant")?,
        amount: row.get("amount")?,
        direction: direction
            .parse::<TransactionDirection>()
            .unwrap_or_default(),
        category: row.get("category")?,
        currency: row.get("currency")?,
    })
}

impl Database {
    /// Insert a transaction
    pub fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (id, user_id, file_id, date, description, merchant, amount, direction, category, currency)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.user_id,
                tx.file_id,
                tx.date,
                tx.description,
                tx.merchant,
                tx.amount,
                tx.direction.as_str(),
                tx.category,
                tx.currency,
            ],
        )?;
        Ok(())
    }

    /// Fetch transactions in scope, optionally most recent first, capped at `limit`
    pub fn fetch_transactions(
        &self,
        user_id: i64,
        file_id: Option<&str>,
        limit: usize,
        newest_first: bool,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let order = if newest_first { "DESC" } else { "ASC" };

        let transactions = if let Some(file_id) = file_id {
            let sql = format!(
                r#"
                SELECT id, user_id, file_id, date, description, merchant, amount, direction, category, currency
                FROM transactions
                WHERE user_id = ? AND file_id = ?
                ORDER BY date {}, created_at {}
                LIMIT ?
                "#,
                order, order
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, file_id, limit as i64], row_to_transaction)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let sql = format!(
                r#"
                SELECT id, user_id, file_id, date, description, merchant, amount, direction, category, currency
                FROM transactions
                WHERE user_id = ?
                ORDER BY date {}, created_at {}
                LIMIT ?
                "#,
                order, order
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, limit as i64], row_to_transaction)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(transactions)
    }
}
