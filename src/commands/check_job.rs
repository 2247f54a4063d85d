use crate::workflows::JobRequest;
use anyhow::Context;
use std::path::Path;

/// Validate a job request stored as JSON in `path`, without touching the database.
pub fn check_job(path: &Path) -> anyhow::Result<JobRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request: JobRequest =
        serde_json::from_str(&content).context("failed to parse job request")?;
    request.validate()?;
    Ok(request)
}
