use tokio::sync::watch;

/// Resolve once the shutdown flag is set, or once its sender is gone.
///
/// Safe to use as a `select!` branch in a loop: a closed channel resolves
/// immediately instead of spinning on `changed()` errors.
pub async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolves_on_signal() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { wait_for_shutdown(&mut rx).await });
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_ignores_false_updates() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(false).unwrap();
        let pending =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(&mut rx)).await;
        assert!(pending.is_err());
        drop(tx);
    }

    #[tokio::test]
    async fn test_resolves_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        wait_for_shutdown(&mut rx).await;
    }
}
