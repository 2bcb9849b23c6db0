//! Insight operations
//!
//! Insights are replaced wholesale per scope: scoped delete, then a bulk
//! insert inside one transaction.

use chrono::Utc;
use rusqlite::{params, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Insight, InsightType, Severity};

fn row_to_insight(row: &Row<'_>) -> rusqlite::Result<Insight> {
    let insight_type: String = row.get("insight_type")?;
    let severity: Option<String> = row.get("severity")?;
    let metadata: String = row.get("metadata")?;
    let created_at: String = row.get("created_at")?;

    Ok(Insight {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        file_id: row.get("file_id")?,
        insight_type: insight_type.parse::<InsightType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
        title: row.get("title")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        severity: severity
            .map(|s| {
                s.parse::<Severity>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })
            })
            .transpose()?,
        metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
        created_at: Some(parse_datetime(&created_at)),
    })
}

impl Database {
    /// Delete all insights in scope, returning the number removed
    pub fn delete_insights(&self, user_id: i64, file_id: Option<&str>) -> Result<usize> {
        let conn = self.conn()?;

        let removed = if let Some(file_id) = file_id {
            conn.execute(
                "DELETE FROM insights WHERE user_id = ? AND file_id = ?",
                params![user_id, file_id],
            )?
        } else {
            conn.execute("DELETE FROM insights WHERE user_id = ?", params![user_id])?
        };

        Ok(removed)
    }

    /// Bulk-insert a batch of insights, stamping creation time
    ///
    /// All-or-nothing: the batch runs inside a single transaction.
    pub fn insert_insights(&self, insights: &[Insight]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO insights (id, user_id, file_id, insight_type, title, description, icon, severity, metadata, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

            for insight in insights {
                stmt.execute(params![
                    insight.id,
                    insight.user_id,
                    insight.file_id,
                    insight.insight_type.as_str(),
                    insight.title,
                    insight.description,
                    insight.icon,
                    insight.severity.map(|s| s.as_str()),
                    insight.metadata.to_string(),
                    created_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// List insights in scope, newest first
    pub fn list_insights(&self, user_id: i64, file_id: Option<&str>) -> Result<Vec<Insight>> {
        let conn = self.conn()?;

        let insights = if let Some(file_id) = file_id {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, user_id, file_id, insight_type, title, description, icon, severity, metadata, created_at
                FROM insights
                WHERE user_id = ? AND file_id = ?
                ORDER BY created_at DESC, id
                "#,
            )?;
            let rows = stmt.query_map(params![user_id, file_id], row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, user_id, file_id, insight_type, title, description, icon, severity, metadata, created_at
                FROM insights
                WHERE user_id = ?
                ORDER BY created_at DESC, id
                "#,
            )?;
            let rows = stmt.query_map(params![user_id], row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insight(id: &str, user_id: i64, file_id: Option<&str>) -> Insight {
        Insight {
            id: id.to_string(),
            user_id,
            file_id: file_id.map(str::to_string),
            insight_type: InsightType::Alert,
            title: "Negative Cash Flow".to_string(),
            description: "Expenses exceed income".to_string(),
            icon: "AlertTriangle".to_string(),
            severity: Some(Severity::Warning),
            metadata: json!({"source": "ai_analysis"}),
            created_at: None,
        }
    }

    #[test]
    fn test_insert_and_list_round_trip() {
        let db = Database::in_memory().unwrap();
        db.insert_insights(&[insight("a", 1, Some("f1"))]).unwrap();

        let listed = db.list_insights(1, Some("f1")).unwrap();
        assert_eq!(listed.len(), 1);

        let fetched = &listed[0];
        assert_eq!(fetched.id, "a");
        assert_eq!(fetched.insight_type, InsightType::Alert);
        assert_eq!(fetched.title, "Negative Cash Flow");
        assert_eq!(fetched.description, "Expenses exceed income");
        assert_eq!(fetched.icon, "AlertTriangle");
        assert_eq!(fetched.severity, Some(Severity::Warning));
        assert_eq!(fetched.metadata["source"], "ai_analysis");
        // Stamped by the store
        assert!(fetched.created_at.is_some());
    }

    #[test]
    fn test_delete_scoped_to_file() {
        let db = Database::in_memory().unwrap();
        db.insert_insights(&[
            insight("a", 1, Some("f1")),
            insight("b", 1, Some("f2")),
            insight("c", 2, Some("f1")),
        ])
        .unwrap();

        let removed = db.delete_insights(1, Some("f1")).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.list_insights(1, None).unwrap().len(), 1);
        assert_eq!(db.list_insights(2, None).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_without_file_clears_user_context() {
        let db = Database::in_memory().unwrap();
        db.insert_insights(&[insight("a", 1, Some("f1")), insight("b", 1, None)])
            .unwrap();

        let removed = db.delete_insights(1, None).unwrap();
        assert_eq!(removed, 2);
        assert!(db.list_insights(1, None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_id_rolls_back_whole_batch() {
        let db = Database::in_memory().unwrap();
        db.insert_insights(&[insight("a", 1, None)]).unwrap();

        // Second batch contains a duplicate key; nothing from it must land
        let result = db.insert_insights(&[insight("b", 1, None), insight("a", 1, None)]);
        assert!(result.is_err());
        assert_eq!(db.list_insights(1, None).unwrap().len(), 1);
    }
}
