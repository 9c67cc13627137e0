//! End-to-end runs of the reqwest transport against a local axum server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use influxdb_client::{
    ClientConfiguration, ClientError, Database, InfluxDbClient, Serie, ServerVersion,
    TimePrecision,
};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    query: String,
    body: Vec<u8>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn record(State(log): State<Log>, method: Method, uri: Uri, body: Bytes) -> Response {
    log.lock().unwrap().push(Seen {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body: body.to_vec(),
    });

    match (method.as_str(), uri.path()) {
        ("GET", "/ping") => (
            StatusCode::NO_CONTENT,
            [("X-Influxdb-Version", "0.12.2")],
        )
            .into_response(),
        ("GET", "/db") => axum::Json(json!([{"name": "mydb"}])).into_response(),
        ("GET", "/db/mydb/series") => axum::Json(json!([
            {"name": "cpu", "columns": ["time", "value"], "points": [[1, 0.5]]}
        ]))
        .into_response(),
        ("GET", "/query") => axum::Json(json!({"results": [{"series": [
            {"name": "cpu", "columns": ["time", "value"], "values": [[1, 0.5]]}
        ]}]}))
        .into_response(),
        ("DELETE", "/db/locked") => (StatusCode::FORBIDDEN, "locked").into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn spawn_server() -> anyhow::Result<(SocketAddr, Log)> {
    let log: Log = Arc::default();
    let app = Router::new().fallback(record).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok((addr, log))
}

fn client(addr: SocketAddr, version: ServerVersion) -> anyhow::Result<InfluxDbClient> {
    let config = ClientConfiguration::new(&format!("http://{addr}"), "root", "p@ss word", version)?;
    Ok(InfluxDbClient::new(config)?)
}

#[tokio::test]
async fn legacy_calls_reach_the_server() -> anyhow::Result<()> {
    let (addr, log) = spawn_server().await?;
    let client = client(addr, ServerVersion::Legacy)?;

    assert_eq!(client.describe_databases().await?, vec![Database::new("mydb")]);

    let series = client
        .query("mydb", "select * from cpu", TimePrecision::Seconds)
        .await?;
    assert_eq!(series[0].name, "cpu");

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/db");
    assert_eq!(seen[0].query, "u=root&p=p%40ss+word");
    assert!(seen[1].query.starts_with("u=root&p=p%40ss+word&q=select"));
    assert!(seen[1].query.ends_with("&time_precision=s"));
    Ok(())
}

#[tokio::test]
async fn write_body_and_content_type_arrive_intact() -> anyhow::Result<()> {
    let (addr, log) = spawn_server().await?;
    let client = client(addr, ServerVersion::V012x)?;

    let series = [Serie::new("cpu", ["time", "value"]).with_point(vec![json!(5), json!(0.5)])];
    client.write("mydb", &series, TimePrecision::Seconds).await?;

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/write");
    assert_eq!(String::from_utf8(seen[0].body.clone())?, "cpu value=0.5 5");
    Ok(())
}

#[tokio::test]
async fn v012x_ping_reads_version_header() -> anyhow::Result<()> {
    let (addr, log) = spawn_server().await?;
    let client = client(addr, ServerVersion::V012x)?;

    let pong = client.ping().await?;
    assert_eq!(pong.status, "ok");
    assert_eq!(pong.version.as_deref(), Some("0.12.2"));
    assert_eq!(log.lock().unwrap()[0].query, "");

    let series = client
        .query("mydb", "select * from cpu", TimePrecision::Milliseconds)
        .await?;
    assert_eq!(series[0].points, vec![vec![json!(1), json!(0.5)]]);
    Ok(())
}

#[tokio::test]
async fn path_segments_are_percent_encoded() -> anyhow::Result<()> {
    let (addr, log) = spawn_server().await?;
    let client = client(addr, ServerVersion::Legacy)?;

    client.delete_database("my db/1").await?;
    assert_eq!(log.lock().unwrap()[0].path, "/db/my%20db%2F1");
    Ok(())
}

#[tokio::test]
async fn rejected_call_carries_status_and_body() -> anyhow::Result<()> {
    let (addr, _log) = spawn_server().await?;
    let client = client(addr, ServerVersion::Legacy)?;

    match client.delete_database("locked").await {
        Err(ClientError::Server { status, body, .. }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "locked");
        }
        other => panic!("expected a server error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = client(addr, ServerVersion::Legacy)?;
    let err = client.describe_databases().await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("GET /db"));
    Ok(())
}
