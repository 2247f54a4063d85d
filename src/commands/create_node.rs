use crate::config::Config;
use crate::models::{NewNode, Node, NodeId};
use anyhow::{bail, Context};
use tracing::info;

/// Register a new node (worker) jobs can be bound to.
pub async fn create_node(name: String, config: Config) -> anyhow::Result<NodeId> {
    let pool = config
        .database_pool()
        .await
        .map_err(anyhow::Error::msg)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    let mut conn = pool
        .acquire()
        .await
        .context("failed to acquire db connection")?;

    if let Some(node) = Node::get_from_name(&name, &mut conn)
        .await
        .context("failed to look up nodes")?
    {
        bail!("node {:?} already exists, with id {}", name, node.id);
    }
    let node = Node::<NewNode>::new(&name)
        .create(&mut conn)
        .await
        .with_context(|| format!("failed to create node {:?}", name))?;
    info!(node_id = node.id, node = %node.name, "node created");
    Ok(node.id)
}
