//! Message dispatcher adapter.
//!
//! The chat transport lives outside this crate; it plugs in by implementing
//! [`MessageDispatcher`]. [`ConsoleDispatcher`] is the built-in stand-in for
//! local runs and development.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for delivering a composed digest to a destination group.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Deliver `message` to the group identified by `group_id`.
    async fn send(&self, group_id: &str, message: &str) -> Result<()>;
}

/// Dispatcher that prints digests to stdout instead of a chat transport.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDispatcher;

#[async_trait]
impl MessageDispatcher for ConsoleDispatcher {
    async fn send(&self, group_id: &str, message: &str) -> Result<()> {
        println!("--- digest for {group_id} ---\n{message}\n");
        Ok(())
    }
}
