/// Background task implementations
use crate::{context::AppContext, db, error::PortalResult};

/// Cleanup expired sessions
pub async fn cleanup_expired_sessions(ctx: &AppContext) -> PortalResult<u64> {
    ctx.account_manager.cleanup_expired_sessions().await
}

/// Verify the database still answers
pub async fn health_check(ctx: &AppContext) -> PortalResult<()> {
    db::test_connection(&ctx.db).await
}
