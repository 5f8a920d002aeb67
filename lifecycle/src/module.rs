//! The unit of work a scheduler runs each round

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::response::Response;

/// A unit of work run once per scheduler round.
///
/// The scheduler calls [`Module::start`] with the part of the round payload
/// stored under [`Module::name`]. Returning an error (or panicking) is logged
/// and never stops the round. `cancel` fires when the scheduler is asked to
/// stop; long-running modules should watch it and return early.
#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self, data: &Response, cancel: CancellationToken) -> anyhow::Result<()>;
}
