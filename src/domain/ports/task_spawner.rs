use futures::future::BoxFuture;

/// Runs fire-and-forget work (notification fan-out, worker loops) off the
/// request path without tying callers to a specific runtime.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, future: BoxFuture<'static, ()>);
}
