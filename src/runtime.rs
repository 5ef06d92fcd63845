use std::time::Duration;

use futures::future::LocalBoxFuture;
use pickup_core::gateways::Runtime;

/// Runs tasks on the current [`tokio::task::LocalSet`].
#[derive(Debug, Default)]
pub struct TokioRuntime;

impl Runtime for TokioRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
