//! End-to-end tests of the client against the mock RCON server.

#[cfg(test)]
mod tests {
    use crate::mock_server::{MockBehavior, MockRconServer};
    use client::{ClientConfig, ClientError, RconClient, SessionState};
    use std::time::Duration;
    use tokio::task::JoinSet;

    async fn spawn_server(behavior: MockBehavior) -> MockRconServer {
        MockRconServer::bind("127.0.0.1:0", behavior)
            .await
            .expect("mock server should bind an ephemeral port")
    }

    fn test_config(server: &MockRconServer) -> ClientConfig {
        let mut config = ClientConfig::new("127.0.0.1", server.port(), "secret");
        config.connect_timeout_secs = 2;
        config.io_timeout_secs = 2;
        config.exec_timeout_secs = 2;
        config.max_reconnect_attempts = 3;
        config.reconnect_backoff_ms = 50;
        config
    }

    #[tokio::test]
    async fn execute_returns_canned_list_response() {
        let server = spawn_server(MockBehavior::default()).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        let output = client.execute("list").await.unwrap();
        assert_eq!(output, "There are 0 of a max of 20 players online:");
        assert_eq!(client.state().await, SessionState::Ready);

        client.close().await;
        assert_eq!(client.state().await, SessionState::Disconnected);
    }

    #[tokio::test]
    async fn empty_command_round_trips_without_error() {
        let server = spawn_server(MockBehavior::default()).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        let output = client.execute("").await.unwrap();
        assert_eq!(output, "");
        client.close().await;
    }

    #[tokio::test]
    async fn wrong_password_yields_invalid_credentials_and_failed_session() {
        let server = spawn_server(MockBehavior::default()).await;
        let mut config = test_config(&server);
        config.password = "wrong".into();

        let client = RconClient::new(config);
        let err = client.execute("list").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
        assert!(!err.is_retryable());
        assert_eq!(client.state().await, SessionState::Failed);
    }

    #[tokio::test]
    async fn eager_connect_rejects_wrong_password() {
        let server = spawn_server(MockBehavior::default()).await;
        let mut config = test_config(&server);
        config.password = "wrong".into();

        let err = RconClient::connect(config).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
    }

    #[tokio::test]
    async fn multi_frame_response_reassembles_in_order() {
        let expected: String = (0..30)
            .map(|i| format!("player-{i:02} joined the game\n"))
            .collect();

        let mut behavior = MockBehavior::default();
        behavior.split_frames = 3;
        behavior.interleave_empty_ack = true;
        behavior
            .responses
            .insert("history".to_string(), expected.clone());

        let server = spawn_server(behavior).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        let output = client.execute("history").await.unwrap();
        assert_eq!(output, expected);
        client.close().await;
    }

    #[tokio::test]
    async fn handshake_skips_empty_acknowledgement_frames() {
        let mut behavior = MockBehavior::default();
        behavior.ack_before_auth = true;

        let server = spawn_server(behavior).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        let output = client.execute("list").await.unwrap();
        assert_eq!(output, "There are 0 of a max of 20 players online:");
        client.close().await;
    }

    #[tokio::test]
    async fn parallel_executes_are_serialized_on_the_wire() {
        let server = spawn_server(MockBehavior::default()).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        let mut tasks = JoinSet::new();
        for i in 0..10 {
            let client = client.clone();
            tasks.spawn(async move { client.execute(&format!("say {i}")).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        // Every real command must be followed by its own sentinel
        // before the next command appears: pairs of (command, empty).
        let log = server.received_commands().await;
        assert_eq!(log.len(), 20);
        for pair in log.chunks(2) {
            assert!(!pair[0].is_empty(), "expected a command, got a sentinel");
            assert!(pair[1].is_empty(), "expected a sentinel, got {:?}", pair[1]);
        }
        client.close().await;
    }

    #[tokio::test]
    async fn exec_timeout_leaves_session_usable_and_drops_stray_response() {
        let mut behavior = MockBehavior::default();
        behavior
            .delays
            .insert("backup".to_string(), Duration::from_millis(1500));

        let server = spawn_server(behavior).await;
        let mut config = test_config(&server);
        config.exec_timeout_secs = 1;
        let client = RconClient::connect(config).await.unwrap();

        let err = client.execute("backup").await.unwrap_err();
        assert!(matches!(err, ClientError::ExecTimeout));
        // Unknown outcome, not a dead connection: the session stays up.
        assert_eq!(client.state().await, SessionState::Ready);

        // The next command sees the late "backup" response arrive as a
        // stray, drops it, and completes normally.
        let output = client.execute("list").await.unwrap();
        assert_eq!(output, "There are 0 of a max of 20 players online:");
        client.close().await;
    }

    #[tokio::test]
    async fn killed_connection_reconnects_transparently() {
        let server = spawn_server(MockBehavior::default()).await;
        let client = RconClient::connect(test_config(&server)).await.unwrap();

        client.execute("list").await.unwrap();
        assert_eq!(server.connections(), 1);

        server.kill_connections();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // No caller-visible error: the dead socket is detected before
        // the command is sent, and the session reauthenticates.
        let output = client.execute("list").await.unwrap();
        assert_eq!(output, "There are 0 of a max of 20 players online:");
        assert_eq!(server.connections(), 2);
        client.close().await;
    }

    #[tokio::test]
    async fn unanswered_handshake_times_out_as_retryable() {
        let mut behavior = MockBehavior::default();
        behavior.silent_auth = true;

        let server = spawn_server(behavior).await;
        let mut config = test_config(&server);
        config.io_timeout_secs = 1;
        config.max_reconnect_attempts = 2;

        let client = RconClient::new(config);
        let err = client.execute("list").await.unwrap_err();
        assert!(matches!(err, ClientError::HandshakeTimeout));
        assert!(err.is_retryable());
        assert_ne!(client.state().await, SessionState::Ready);
    }

    #[tokio::test]
    async fn idle_session_is_torn_down_and_reestablished() {
        let server = spawn_server(MockBehavior::default()).await;
        let mut config = test_config(&server);
        config.idle_timeout_secs = 1;

        let client = RconClient::connect(config).await.unwrap();
        client.execute("list").await.unwrap();
        assert_eq!(server.connections(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        client.execute("list").await.unwrap();
        assert_eq!(server.connections(), 2);
        client.close().await;
    }

    #[tokio::test]
    async fn lazy_client_starts_disconnected() {
        let server = spawn_server(MockBehavior::default()).await;
        let client = RconClient::new(test_config(&server));
        assert_eq!(client.state().await, SessionState::Disconnected);
    }
}
