/// Concurrent and sequential dispatch through the full transport loop
use super::common::{text_of, TestClient};
use hello_world_mcp::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn sleeper_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register_tool(
            "sleep",
            "Sleeps for `ms` milliseconds",
            vec![ParameterSpec::required("ms", ParamType::Number, "Delay in milliseconds")],
            |args, ctx| async move {
                let ms = args.number("ms")? as u64;
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, ToolError>(ToolOutput::text(format!("slept {} for {}", ms, ctx.request_id())))
            },
        )
        .unwrap();
    registry
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn test_calls_run_concurrently() {
        const CALLS: usize = 4;
        let barrier = Arc::new(Barrier::new(CALLS));

        let mut registry = ToolRegistry::new();
        registry
            .register_tool("rendezvous", "Waits for its peers", vec![], move |_args, ctx| {
                let barrier = barrier.clone();
                async move {
                    // Only released once every call is running at the same time.
                    barrier.wait().await;
                    Ok(ToolOutput::text(ctx.request_id().to_string()))
                }
            })
            .unwrap();
        let mut client = TestClient::start(registry, ServerConfig::default());

        for id in 0..CALLS as i64 {
            client.call_tool(id, "rendezvous", json!({})).await;
        }

        let mut seen = Vec::new();
        for _ in 0..CALLS {
            let response = client.recv().await;
            assert_eq!(text_of(&response), response["id"].to_string());
            seen.push(response["id"].as_i64().unwrap());
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_responses_correlate_by_id() {
        let mut client = TestClient::builtin(ServerConfig::default());

        for id in 0..50 {
            let name = format!("user-{}", id);
            client.call_tool(id, "hello_world", json!({"name": name})).await;
        }

        let mut greetings = HashMap::new();
        for _ in 0..50 {
            let response = client.recv().await;
            greetings.insert(response["id"].as_i64().unwrap(), text_of(&response).to_string());
        }

        assert_eq!(greetings.len(), 50);
        for (id, greeting) in greetings {
            assert_eq!(greeting, format!("Hello, user-{}!", id));
        }
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_fast_call() {
        let mut client = TestClient::start(sleeper_registry(), ServerConfig::default());

        client.call_tool(1, "sleep", json!({"ms": 300})).await;
        client.call_tool(2, "sleep", json!({"ms": 0})).await;

        assert_eq!(client.recv().await["id"], 2);
        assert_eq!(client.recv().await["id"], 1);
    }

    #[tokio::test]
    async fn test_sequential_mode_preserves_request_order() {
        let mut client = TestClient::start(sleeper_registry(), ServerConfig::default().sequential());

        client.call_tool(1, "sleep", json!({"ms": 200})).await;
        client.call_tool(2, "sleep", json!({"ms": 0})).await;
        client.request(3, "ping", json!({})).await;

        let first = client.recv().await;
        assert_eq!(first["id"], 1);
        assert_eq!(text_of(&first), "slept 200 for 1");
        assert_eq!(client.recv().await["id"], 2);
        assert_eq!(client.recv().await["id"], 3);

        assert!(client.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_max_in_flight_bounds_running_handlers() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut registry = ToolRegistry::new();
        {
            let running = running.clone();
            let peak = peak.clone();
            registry
                .register_tool("busy", "Tracks overlap", vec![], move |_args, _ctx| {
                    let running = running.clone();
                    let peak = peak.clone();
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(ToolOutput::text("done"))
                    }
                })
                .unwrap();
        }
        let config = ServerConfig::default().with_max_in_flight(2);
        let mut client = TestClient::start(registry, config);

        for id in 0..8 {
            client.call_tool(id, "busy", json!({})).await;
        }
        for _ in 0..8 {
            assert_eq!(text_of(&client.recv().await), "done");
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(client.shutdown().await.is_ok());
    }
}
