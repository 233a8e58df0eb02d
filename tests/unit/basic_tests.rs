/// Basic unit tests to verify core functionality
use hello_world_mcp::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn builtin_dispatcher() -> Dispatcher {
    let server = HelloWorldServer::new(ServerConfig::default()).expect("built-in tools register");
    server.into_mcp_server().dispatcher().clone()
}

fn args(value: serde_json::Value) -> Arguments {
    Arguments::try_from(value).expect("object arguments")
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_hello_world_success() {
        let dispatcher = builtin_dispatcher();

        let response = dispatcher
            .dispatch(Request::new(1, "hello_world", args(json!({"name": "Ada"}))))
            .await;

        assert_eq!(response.id, RequestId::Number(1));
        assert_eq!(response.outcome, Outcome::Success(ToolOutput::text("Hello, Ada!")));
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let dispatcher = builtin_dispatcher();

        let response = dispatcher.dispatch(Request::new("a", "hello_world", Arguments::new())).await;

        assert_eq!(
            response.outcome,
            Outcome::Failure(DispatchError::Validation(ValidationError::MissingRequiredField {
                name: "name".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let dispatcher = builtin_dispatcher();

        let response = dispatcher
            .dispatch(Request::new(2, "hello_world", args(json!({"name": 42}))))
            .await;

        assert_eq!(
            response.outcome,
            Outcome::Failure(DispatchError::Validation(ValidationError::TypeMismatch {
                name: "name".to_string(),
                expected: ParamType::String,
                actual: "number".to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let dispatcher = builtin_dispatcher();

        let response = dispatcher.dispatch(Request::new(3, "unknown_tool", Arguments::new())).await;

        assert!(response.is_error());
        assert_eq!(
            response.outcome,
            Outcome::Failure(DispatchError::ToolNotFound("unknown_tool".to_string()))
        );
    }

    #[tokio::test]
    async fn test_extra_arguments_are_ignored() {
        let dispatcher = builtin_dispatcher();

        let response = dispatcher
            .dispatch(Request::new(4, "hello_world", args(json!({"name": "Ada", "mood": "sunny"}))))
            .await;

        assert_eq!(response.outcome, Outcome::Success(ToolOutput::text("Hello, Ada!")));
    }

    #[tokio::test]
    async fn test_handler_runs_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut server = HelloWorldServer::new(ServerConfig::default()).unwrap();
        server
            .register(Tool::from_fn(
                "count",
                "Counts invocations",
                vec![ParameterSpec::optional("note", ParamType::String, "Ignored")],
                move |_args, _ctx| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(ToolOutput::text("counted"))
                    }
                },
            ))
            .unwrap();
        let mcp = server.into_mcp_server();

        mcp.dispatcher().dispatch(Request::new(1, "count", Arguments::new())).await;
        mcp.dispatcher()
            .dispatch(Request::new(2, "count", args(json!({"note": 5}))))
            .await;

        // The second call fails validation and never reaches the handler.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_is_a_startup_error() {
        let mut server = HelloWorldServer::new(ServerConfig::default()).unwrap();

        let duplicate = Tool::from_fn("hello_world", "Impostor", vec![], |_args, _ctx| async {
            Ok(ToolOutput::text("hi"))
        });
        let result = server.register(duplicate);

        assert!(matches!(
            result,
            Err(ServerError::Registry(RegistryError::DuplicateName(ref name))) if name == "hello_world"
        ));
        assert_eq!(server.registry().len(), 1);
        assert_eq!(server.registry().lookup("hello_world").unwrap().description(), "Greet someone");
    }

    #[test]
    fn test_server_freezes_registry() {
        let server = HelloWorldServer::new(ServerConfig::default()).unwrap();
        assert!(!server.registry().is_frozen());

        let mcp = server.into_mcp_server();
        assert!(mcp.dispatcher().registry().is_frozen());
        assert_eq!(mcp.config().name, "Hello World MCP Server");
    }

    #[test]
    fn test_validate_is_deterministic() {
        let schema = hello_world_mcp::tools::hello_world_parameters();
        let bad = args(json!({"name": null}));

        let first = validate(&schema, &bad);
        let second = validate(&schema, &bad);

        assert!(first.is_err());
        assert_eq!(first, second);
    }
}
