use tokio::sync::watch;

/// Process-wide stop flag, flipped by a signal or by the bridge closing.
#[derive(Clone)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn trigger(&self, reason: &str) {
        if !*self.sender.borrow() {
            tracing::info!(target: "shutdown", reason, "shutdown requested");
        }
        self.sender.send_replace(true);
    }
}

impl ShutdownListener {
    pub async fn notified(&mut self) {
        // Err means every sender is gone, which we also treat as shutdown.
        let _ = self.receiver.wait_for(|stop| *stop).await;
    }
}

pub fn install_signal_handlers(shutdown: Shutdown) {
    let ctrlc = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc.trigger("ctrl-c");
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        tokio::spawn(async move {
            if let Ok(mut sig) = signal(SignalKind::terminate()) {
                sig.recv().await;
                shutdown.trigger("SIGTERM");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn listeners_subscribed_before_trigger_wake_up() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();

        let waiter = tokio::spawn(async move { listener.notified().await });
        shutdown.trigger("test");
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("listener should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn late_subscribers_see_trigger_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger("test");
        let mut listener = shutdown.subscribe();
        tokio::time::timeout(Duration::from_millis(100), listener.notified())
            .await
            .expect("already triggered");
    }
}
