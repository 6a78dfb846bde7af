//! Remote-user authentication flow demonstration.
//!
//! This example runs a handful of requests through the gateway the way a
//! web framework integration would:
//! 1. Build a `Request` from the incoming HTTP request
//! 2. Run it through `web::guard`
//! 3. Either bind the identity and call the handler, or send the response
//!
//! Run with: `cargo run --example remote_user_flow`

use remote_user_gate::web::{guard, GateOutcome};
use remote_user_gate::{AuthGateway, GatewayConfig, InMemoryRegistry, Request};

const CONFIG: &str = r#"
maildomain = "example.org"
admin_users = ["bob@example.org"]
remote_user_secret = "s3cr3t"
normalize_remote_user_email = true
"#;

/// Simulates an application handler
fn handle(identity: Option<&str>, path: &str) -> String {
    match identity {
        Some(identity) => format!("200 OK: {path} as {identity}"),
        None => format!("200 OK: {path} (API key authentication)"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = GatewayConfig::from_toml_str(CONFIG)?;
    let registry = InMemoryRegistry::new()
        .with_user("alice@example.org")
        .with_deleted_user("eve@example.org");
    let gateway = AuthGateway::new(config, registry);

    let requests = [
        Request::new("/histories/list")
            .with_header("Remote-User", "Alice")
            .with_header("GX-Secret", "s3cr3t"),
        Request::new("/user/create")
            .with_header("Remote-User", "bob")
            .with_header("GX-Secret", "s3cr3t"),
        Request::new("/user/create")
            .with_header("Remote-User", "alice")
            .with_header("GX-Secret", "s3cr3t"),
        Request::new("/histories/list").with_header("Remote-User", "alice"),
        Request::new("/histories/list")
            .with_header("Remote-User", "eve")
            .with_header("GX-Secret", "s3cr3t"),
        Request::new("/api/histories"),
        Request::new("/histories/list").with_header("Remote-User", "(null)"),
    ];

    for request in requests {
        let path = request.path().to_string();
        match guard(&gateway, request) {
            GateOutcome::Forward(forwarded) => {
                println!("{}", handle(forwarded.identity.as_deref(), &path));
            }
            GateOutcome::Respond(response) => {
                println!("{} {}: {}", response.status(), response.content_type(), path);
            }
        }
    }

    Ok(())
}
