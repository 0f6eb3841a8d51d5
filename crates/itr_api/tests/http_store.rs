use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use itr_api::auth::{AuthApi, HttpAuthApi};
use itr_api::http::ApiClient;
use itr_api::store::{HttpIncidentStore, IncidentStore};
use itr_core::auth::LoginForm;
use itr_core::domain::{Incident, STATUS_OPEN};
use pretty_assertions::assert_eq;
use time::macros::datetime;

/// Request line, headers (lower-cased names) and body as seen by the test server.
#[derive(Debug)]
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

/// Serve exactly one HTTP exchange on an ephemeral port with a canned response.
fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
            }
        }
        let len = headers
            .iter()
            .find(|(n, _)| n == "content-length")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).expect("body");

        let mut stream = stream;
        stream.write_all(response.as_bytes()).expect("write");
        stream.flush().expect("flush");

        tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).expect("utf8"),
        })
        .expect("send");
    });

    (format!("http://{addr}/api"), rx)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).expect("client")
}

fn captured(rx: &mpsc::Receiver<Captured>) -> Captured {
    rx.recv_timeout(Duration::from_secs(5)).expect("captured request")
}

const ONE_INCIDENT: &str = r#"[{
    "id": 3,
    "title": "VPN caída",
    "description": "Sin acceso remoto",
    "category": "Red",
    "priority": "Alta",
    "createdAt": "2026-05-18T08:00:00Z",
    "openingTime": "2026-05-18T08:00:00Z",
    "closingTime": null,
    "assignedTo": null,
    "status": "Abierto",
    "resolution": null
}]"#;

#[test]
fn list_decodes_incidents() {
    let (base, rx) = serve_once("200 OK", ONE_INCIDENT);
    let store = HttpIncidentStore::new(client(&base));

    let incidents = store.list().expect("list");
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].id, 3);
    assert_eq!(incidents[0].created_at, datetime!(2026-05-18 08:00 UTC));
    assert_eq!(incidents[0].closing_time, None);

    assert_eq!(captured(&rx).request_line, "GET /api/incidentes/ HTTP/1.1");
}

#[test]
fn status_filter_is_sent_as_query() {
    let (base, rx) = serve_once("200 OK", "[]");
    let store = HttpIncidentStore::new(client(&base));

    assert!(store.list_by_status("Cerrado").expect("list").is_empty());
    assert_eq!(
        captured(&rx).request_line,
        "GET /api/incidentes/?status=Cerrado HTTP/1.1"
    );
}

#[test]
fn missing_incident_maps_to_not_found() {
    let (base, rx) = serve_once("404 Not Found", r#"{"detail": "Not found."}"#);
    let store = HttpIncidentStore::new(client(&base));

    let err = store.get(42).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message, "Incidente con ID 42 no encontrado");
    assert_eq!(captured(&rx).request_line, "GET /api/incidentes/42/ HTTP/1.1");
}

#[test]
fn create_posts_record_without_id() {
    let created = r#"{
        "id": 1, "title": "Nuevo", "description": "d", "category": "Red", "priority": "Baja",
        "createdAt": "2026-05-20T10:00:00Z", "openingTime": "2026-05-20T10:00:00Z",
        "status": "Abierto"
    }"#;
    let (base, rx) = serve_once("201 Created", created);
    let store = HttpIncidentStore::new(client(&base));

    let at = datetime!(2026-05-20 10:00 UTC);
    let draft = Incident {
        id: 0,
        title: "Nuevo".to_string(),
        description: "d".to_string(),
        category: "Red".to_string(),
        priority: "Baja".to_string(),
        created_at: at,
        opening_time: Some(at),
        closing_time: None,
        assigned_to: None,
        status: STATUS_OPEN.to_string(),
        resolution: None,
    };
    let stored = store.create(&draft).expect("create");
    assert_eq!(stored.id, 1);

    let req = captured(&rx);
    assert_eq!(req.request_line, "POST /api/incidentes/ HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&req.body).expect("json body");
    assert!(sent.get("id").is_none());
    assert_eq!(sent["createdAt"], "2026-05-20T10:00:00Z");
    assert!(req
        .headers
        .iter()
        .any(|(n, v)| n == "content-type" && v.starts_with("application/json")));
}

#[test]
fn server_error_is_status_failure() {
    let (base, _rx) = serve_once("500 Internal Server Error", "oops");
    let store = HttpIncidentStore::new(client(&base));

    let err = store.list().unwrap_err();
    assert_eq!(err.code, "API_STATUS_FAILED");
    assert!(!err.retryable);
}

#[test]
fn closed_port_is_unreachable_and_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = HttpIncidentStore::new(client(&format!("http://{addr}/api")));
    let err = store.list().unwrap_err();
    assert_eq!(err.code, "API_UNREACHABLE");
    assert!(err.retryable);
}

#[test]
fn login_rejection_body_is_decoded() {
    let (base, rx) = serve_once(
        "401 Unauthorized",
        r#"{"success": false, "message": "Credenciales inválidas"}"#,
    );
    let api = HttpAuthApi::new(client(&base));
    let form = LoginForm {
        email: "ana@example.com".to_string(),
        password: "secreto".to_string(),
    };

    let resp = api.login(&form).expect("envelope");
    assert!(!resp.success);
    assert_eq!(resp.into_login_user().unwrap_err().message, "Credenciales inválidas");

    let req = captured(&rx);
    assert_eq!(req.request_line, "POST /api/usuarios/login/ HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&req.body).expect("json body");
    assert_eq!(sent["email"], "ana@example.com");
}

#[test]
fn login_server_error_is_a_status_failure() {
    let (base, _rx) = serve_once(
        "500 Internal Server Error",
        r#"{"detail": "database down"}"#,
    );
    let api = HttpAuthApi::new(client(&base));
    let form = LoginForm {
        email: "ana@example.com".to_string(),
        password: "secreto".to_string(),
    };

    let err = api.login(&form).unwrap_err();
    assert_eq!(err.code, "API_STATUS_FAILED");
    assert!(err.details.expect("details").contains("database down"));
}

#[test]
fn rejection_without_envelope_is_a_status_failure() {
    let (base, _rx) = serve_once("400 Bad Request", r#"{"detail": "bad form"}"#);
    let api = HttpAuthApi::new(client(&base));
    let form = LoginForm {
        email: "ana@example.com".to_string(),
        password: "secreto".to_string(),
    };

    assert_eq!(api.login(&form).unwrap_err().code, "API_STATUS_FAILED");
}
