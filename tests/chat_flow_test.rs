#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pipechat::chat::{inbound, outbound};
    use pipechat::session::ChannelId;
    use pipechat::transport::Endpoint;
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    fn endpoint(dir: &TempDir) -> Endpoint {
        Endpoint::new(dir.path().to_path_buf(), Duration::from_millis(10))
    }

    /// Bind a channel and run an inbound loop over it, returning the message
    /// stream and the cancellation token driving the loop.
    async fn spawn_inbound(
        ep: &Endpoint,
        channel: ChannelId,
    ) -> (
        mpsc::UnboundedReceiver<String>,
        CancellationToken,
        tokio::task::JoinHandle<()>,
    ) {
        let listener = ep.bind(channel.pipe_name()).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(inbound::run(listener, tx, cancel.clone()));
        (rx, cancel, handle)
    }

    #[tokio::test]
    async fn test_keystroke_delivered_exactly_once() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx, cancel, handle) = spawn_inbound(&ep, ChannelId::B).await;

        assert!(outbound::send(&ep, ChannelId::B, Some("x")).await);

        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("message not delivered in time")
            .unwrap();
        assert_eq!(received, "x");
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_messages_arrive_in_send_order() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx, cancel, handle) = spawn_inbound(&ep, ChannelId::B).await;

        for text in ["h", "e", "y", "\n"] {
            assert!(outbound::send(&ep, ChannelId::B, Some(text)).await);
        }

        let mut received = Vec::new();
        for _ in 0..4 {
            received.push(
                timeout(Duration::from_secs(1), rx.recv())
                    .await
                    .expect("message not delivered in time")
                    .unwrap(),
            );
        }
        assert_eq!(received, ["h", "e", "y", "\n"]);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_without_peer_fails_fast() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);

        let start = Instant::now();
        assert!(!outbound::send(&ep, ChannelId::B, Some("lost")).await);
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_probe_delivers_nothing() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx, cancel, handle) = spawn_inbound(&ep, ChannelId::A).await;

        assert!(outbound::send(&ep, ChannelId::A, None).await);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_message_is_not_delivered() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx, cancel, handle) = spawn_inbound(&ep, ChannelId::A).await;

        // Empty text encodes to a zero-length frame, which the receiver
        // treats as absent
        assert!(outbound::send(&ep, ChannelId::A, Some("")).await);
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unblocks_pending_accept() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (_rx, cancel, handle) = spawn_inbound(&ep, ChannelId::A).await;

        // No peer ever connects; cancellation alone must stop the loop
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        timeout(Duration::from_millis(500), handle)
            .await
            .expect("inbound loop did not stop after cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unblocks_in_flight_read() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (_rx, cancel, handle) = spawn_inbound(&ep, ChannelId::A).await;

        // A peer that connects but never writes parks the loop in the frame
        // read; cancellation must still stop it promptly
        let _stream = ep.connect(ChannelId::A.pipe_name()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        timeout(Duration::from_millis(500), handle)
            .await
            .expect("inbound loop did not stop after cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_early_disconnect_does_not_kill_loop() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx, cancel, handle) = spawn_inbound(&ep, ChannelId::B).await;

        // Connect and vanish without writing a frame
        let stream = ep.connect(ChannelId::B.pipe_name()).await.unwrap();
        drop(stream);

        // The loop keeps accepting and delivering
        assert!(outbound::send(&ep, ChannelId::B, Some("still alive")).await);
        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("message not delivered in time")
            .unwrap();
        assert_eq!(received, "still alive");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_bidirectional_exchange() {
        let dir = TempDir::new().unwrap();
        let ep = endpoint(&dir);
        let (mut rx_a, cancel_a, handle_a) = spawn_inbound(&ep, ChannelId::A).await;
        let (mut rx_b, cancel_b, handle_b) = spawn_inbound(&ep, ChannelId::B).await;

        assert!(outbound::send(&ep, ChannelId::B, Some("from A")).await);
        assert!(outbound::send(&ep, ChannelId::A, Some("from B")).await);

        let at_b = timeout(Duration::from_secs(1), rx_b.recv()).await.unwrap().unwrap();
        let at_a = timeout(Duration::from_secs(1), rx_a.recv()).await.unwrap().unwrap();
        assert_eq!(at_b, "from A");
        assert_eq!(at_a, "from B");

        cancel_a.cancel();
        cancel_b.cancel();
        handle_a.await.unwrap();
        handle_b.await.unwrap();
    }
}
