use std::net::TcpListener;
use std::time::Duration;

use anyhow::Result;
use ocm_quota_exporter::{ExporterConfig, ExporterServer};
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTA_COST_PATH: &str = "/api/accounts_mgmt/v1/organizations/org-1/quota_cost";

fn unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind ephemeral port")
        .local_addr()
        .expect("listener has no local addr")
        .port()
}

fn base_config(ocm_url: String, port: u16, organization_id: Option<&str>) -> ExporterConfig {
    ExporterConfig {
        listen_host: "127.0.0.1".to_string(),
        port,
        organization_id: organization_id.map(str::to_string),
        ocm_url,
        token: "integration-token".to_string(),
        debug: false,
        fetch_timeout_secs: 2,
        request_timeout_secs: 1,
        page_size: 100,
    }
}

async fn start_exporter(config: ExporterConfig) -> (JoinHandle<Result<()>>, String) {
    let addr = config.listen_addr();
    let base_url = format!("http://{}", addr);
    let server = ExporterServer::build(config)
        .await
        .expect("failed to build exporter");
    let handle = tokio::spawn(async move { server.run().await });
    wait_for_port(&addr).await;
    (handle, base_url)
}

async fn wait_for_port(addr: &str) {
    for _ in 0..10 {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return,
            Err(_) => sleep(Duration::from_millis(50)).await,
        }
    }
    panic!("exporter [{}] did not become ready in time", addr);
}

async fn teardown(handle: JoinHandle<Result<()>>) {
    handle.abort();
    let _ = handle.await;
}

async fn scrape(base_url: &str) -> Result<(u16, String)> {
    let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
    let response = client.get(format!("{}/metrics", base_url)).send().await?;
    let status = response.status().as_u16();
    Ok((status, response.text().await?))
}

#[tokio::test(flavor = "multi_thread")]
async fn scrape_exposes_quota_costs() -> Result<()> {
    let ocm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUOTA_COST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "QuotaCostList",
            "page": 1,
            "size": 2,
            "total": 2,
            "items": [
                { "organization_id": "org-1", "quota_id": "q1", "consumed": 5, "allowed": 10 },
                { "organization_id": "org-1", "quota_id": "q2", "consumed": 0, "allowed": 3 }
            ]
        })))
        .mount(&ocm)
        .await;

    let (handle, base_url) =
        start_exporter(base_config(ocm.uri(), unused_port(), Some("org-1"))).await;

    let (status, body) = scrape(&base_url).await?;
    assert_eq!(status, 200);
    assert!(body.contains("# TYPE ocm_quota_cost gauge"));
    assert!(body.contains(r#"ocm_quota_cost{organization_id="org-1",quota_id="q1",type="consumed"} 5"#));
    assert!(body.contains(r#"ocm_quota_cost{organization_id="org-1",quota_id="q1",type="allowed"} 10"#));
    assert!(body.contains(r#"ocm_quota_cost{organization_id="org-1",quota_id="q2",type="allowed"} 3"#));

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_outage_yields_empty_but_successful_scrape() -> Result<()> {
    let ocm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUOTA_COST_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ocm)
        .await;

    let (handle, base_url) =
        start_exporter(base_config(ocm.uri(), unused_port(), Some("org-1"))).await;

    let (status, body) = scrape(&base_url).await?;
    assert_eq!(status, 200);
    assert!(!body.contains("ocm_quota_cost"));

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn organization_is_resolved_from_current_account() -> Result<()> {
    let ocm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts_mgmt/v1/current_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "account-1",
            "organization": { "id": "org-1" }
        })))
        .expect(1)
        .mount(&ocm)
        .await;
    Mock::given(method("GET"))
        .and(path(QUOTA_COST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "QuotaCostList",
            "page": 1,
            "size": 1,
            "total": 1,
            "items": [{ "organization_id": "org-1", "quota_id": "q1", "consumed": 1, "allowed": 2 }]
        })))
        .mount(&ocm)
        .await;

    let server = ExporterServer::build(base_config(ocm.uri(), unused_port(), None)).await?;
    assert_eq!(server.organization_id(), "org-1");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn health_endpoint_reports_healthy() -> Result<()> {
    let ocm = MockServer::start().await;
    let (handle, base_url) =
        start_exporter(base_config(ocm.uri(), unused_port(), Some("org-1"))).await;

    let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
    let response = client.get(format!("{}/health", base_url)).send().await?;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body,
        json!({ "status": "healthy", "service": "ocm-quota-exporter" })
    );

    teardown(handle).await;
    Ok(())
}
