//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives the real client (with
//! the default `ureq` executor) against it, covering the verification
//! handshake, every repository operation, metrics and close.

use std::net::SocketAddr;
use std::time::Duration;

use mock_server::MockState;
use nexus_client::{ClientBuilder, ClientError, Email, NexusClient};

const VENDOR: &str = "vendor123";
const TOKEN: &str = "vendorsecret123";

/// Serve `state` on a random local port from a background thread.
fn start_server(state: MockState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn builder(addr: SocketAddr) -> ClientBuilder {
    NexusClient::with_token(TOKEN)
        .with_vendor_id(VENDOR)
        .with_base_url(format!("http://{addr}"))
        .with_verify_delay(Duration::from_millis(10))
        .with_connection_timeout(Duration::from_secs(2))
        .with_read_timeout(Duration::from_secs(5))
}

#[test]
fn full_client_lifecycle() {
    let state = MockState::seeded(VENDOR, TOKEN);
    let addr = start_server(state.clone());

    // Step 1: build, which verifies against /ping.
    let client = builder(addr).build().unwrap();
    assert_eq!(state.ping_count(), 1);

    // Step 2: list users.
    let users = client.users().get_users().unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username()).collect();
    assert_eq!(names, ["ada", "grace"]);

    // Step 3: get a single user.
    let ada = client
        .users()
        .get_user("b699523a-d185-432a-a58e-2ddbebecc8e3")
        .unwrap();
    assert_eq!(ada.first_name(), "Ada");
    assert_eq!(ada.avatar(), Some("https://cdn.example.com/ada.png"));

    // Step 4: send an email through the live record.
    let accepted = ada
        .send_email(Some(&Email::new("Welcome", "Glad to have you")))
        .unwrap();
    assert!(accepted);

    // Step 5: services.
    let services = client.services().get_services().unwrap();
    assert_eq!(services.len(), 2);
    let search = client.services().get_service("svc-search").unwrap();
    assert_eq!(search.name(), "Search");

    // Step 6: a missing user is a RequestFailed carrying 404.
    let err = client.users().get_user("ghost").unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    // Step 7: metrics saw 5 successes and 1 failure; the ping is not counted.
    let metrics = client.metrics();
    assert_eq!(metrics.total_requests(), 6);
    assert_eq!(metrics.successful_requests(), 5);
    assert_eq!(metrics.failed_requests(), 1);
    assert!((metrics.success_rate() - 100.0 * 5.0 / 6.0).abs() < 1e-9);

    // Step 8: close and confirm requests are refused.
    client.close();
    client.close();
    assert!(matches!(
        client.services().get_services(),
        Err(ClientError::Closed)
    ));
}

#[test]
fn email_reaches_the_server_outbox() {
    let state = MockState::seeded(VENDOR, TOKEN);
    let addr = start_server(state.clone());
    let client = builder(addr).build().unwrap();

    let ok = client
        .users()
        .send_email("u-grace", Some(&Email::html("Report", "<b>done</b>")))
        .unwrap();
    assert!(ok);

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let sent = rt.block_on(state.sent_emails());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, "u-grace");
    assert_eq!(sent[0].email.subject, "Report");
    assert!(sent[0].email.is_html);
}

#[test]
fn verification_retries_until_ping_recovers() {
    let state = MockState::seeded(VENDOR, TOKEN).with_failing_pings(2);
    let addr = start_server(state.clone());

    let client = builder(addr).with_verify_attempts(5).build().unwrap();

    assert_eq!(state.ping_count(), 3);
    assert!(client.users().get_users().is_ok());
}

#[test]
fn verification_gives_up_after_configured_attempts() {
    let state = MockState::seeded(VENDOR, TOKEN).with_failing_pings(100);
    let addr = start_server(state.clone());

    let err = builder(addr).with_verify_attempts(3).build().err().unwrap();

    assert!(matches!(err, ClientError::Authentication { attempts: 3 }));
    assert!(err.to_string().contains("Failed to verify connection"));
    assert_eq!(state.ping_count(), 3);
}

#[test]
fn wrong_credentials_fail_verification() {
    let state = MockState::seeded(VENDOR, TOKEN);
    let addr = start_server(state.clone());

    let err = NexusClient::with_token("testtoken123?")
        .with_vendor_id("testvendor123")
        .with_base_url(format!("http://{addr}"))
        .with_verify_attempts(1)
        .build()
        .err()
        .unwrap();

    assert!(err.is_authentication());
    assert_eq!(state.ping_count(), 1);
}

#[test]
fn wrong_base_path_fails_verification() {
    let addr = start_server(MockState::seeded(VENDOR, TOKEN));

    let err = builder(addr)
        .with_base_url(format!("http://{addr}/not-nexus"))
        .with_verify_attempts(2)
        .build()
        .err()
        .unwrap();

    assert!(err.is_authentication());
}

#[test]
fn unreachable_server_fails_verification() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = builder(addr).with_verify_attempts(2).build().err().unwrap();

    assert!(matches!(err, ClientError::Authentication { attempts: 2 }));
}
