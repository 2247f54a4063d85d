use crate::models::ModelError;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

/// Newly created node, (not in database)
#[derive(Debug, Clone, Copy)]
pub struct NewNode;
/// Id of an existing Node in the `nodes` table
pub type NodeId = i64;

/// Abstraction over the `nodes` SQl table, defined as such:
/// ```sql
/// CREATE TABLE IF NOT EXISTS nodes (
///       id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
///       name VARCHAR(256) NOT NULL UNIQUE,
///       created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// A node is a worker jobs are bound to, the worker side is not handled here:
/// this table only gives jobs something to reference.
#[derive(Debug, Serialize)]
pub struct Node<Id> {
    /// database index
    pub id: Id,
    /// unique name of the worker
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl Node<NewNode> {
    pub fn new(name: &str) -> Self {
        Node {
            id: NewNode,
            name: name.to_owned(),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub async fn create(self, conn: &mut SqliteConnection) -> Result<Node<NodeId>, ModelError> {
        let query_result = sqlx::query(
            "INSERT INTO nodes (name, created_at) \
            VALUES (?, ?)",
        )
        .bind(&self.name)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        let node_id: NodeId = query_result.last_insert_rowid();
        Ok(Node {
            id: node_id,
            name: self.name,
            created_at: self.created_at,
        })
    }
}

impl Node<NodeId> {
    /// Select a Node by its name, `None` if there is no such node.
    pub async fn get_from_name(
        name: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<Self>, ModelError> {
        let row: Option<(NodeId, NaiveDateTime)> =
            sqlx::query_as("SELECT id, created_at FROM nodes WHERE name = ?")
                .bind(name)
                .fetch_optional(conn)
                .await?;

        Ok(row.map(|(id, created_at)| Node {
            id,
            name: name.to_owned(),
            created_at,
        }))
    }
}
