use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Single-threaded task execution and timers.
pub trait Runtime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Invokes `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let sleep = self.sleep(delay);
        self.spawn(Box::pin(async move {
            sleep.await;
            callback();
        }));
    }
}
