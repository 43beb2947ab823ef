use mae_core::config::ClientConfig;
use mae_core::entry::EntryId;
use mae_core::session::Credential;
use mae_core::{AuthBackend, CollectionBackend, MaeError};
use mae_infrastructure::HttpBackend;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Answers a single request with a canned JSON response.
/// The handle resolves to the raw request the client sent.
async fn serve_once(status: u16, body: &'static str) -> (HttpBackend, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (HttpBackend::new(&ClientConfig::new(url)).unwrap(), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn credential() -> Credential {
    Credential::new("tok-1")
}

#[tokio::test]
async fn test_fetch_sends_bearer_token() {
    let (backend, server) =
        serve_once(200, r#"[{"_id":"a","user_id":"u-1","number":1,"text":"Un"}]"#).await;

    let entries = backend.fetch_all("de10", &credential()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id.as_str(), "a");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/de10 HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer tok-1"));
}

#[tokio::test]
async fn test_rejected_token_is_authentication_error() {
    let (backend, server) = serve_once(401, r#"{"detail":"Token expired"}"#).await;

    let err = backend.fetch_all("de10", &credential()).await.unwrap_err();
    assert_eq!(err, MaeError::Authentication("Token expired".to_string()));
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_backend_error() {
    let (backend, server) = serve_once(500, "").await;

    let err = backend.fetch_all("de10", &credential()).await.unwrap_err();
    assert_eq!(err, MaeError::backend(500, "Internal Server Error"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_remove_encodes_id_and_reports_detail() {
    let (backend, server) = serve_once(404, r#"{"detail":"Entry not found"}"#).await;

    let err = backend
        .remove("de10", &credential(), &EntryId::new("a/b"))
        .await
        .unwrap_err();
    assert_eq!(err, MaeError::backend(404, "Entry not found"));

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /api/de10/a%2Fb HTTP/1.1"));
}

#[tokio::test]
async fn test_login_success() {
    let (backend, server) = serve_once(
        200,
        r#"{"token":"jwt-abc","user":{"id":"u-1","email":"mae@example.com"}}"#,
    )
    .await;

    let grant = backend.login("mae@example.com", "hunter2").await.unwrap();
    assert_eq!(grant.credential.expose(), "jwt-abc");
    assert_eq!(grant.identity.id, "u-1");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/auth/login HTTP/1.1"));
    assert!(request.contains(r#""email":"mae@example.com""#));
    assert!(request.contains(r#""password":"hunter2""#));
}

#[tokio::test]
async fn test_login_bad_request_is_authentication_error() {
    let (backend, server) = serve_once(400, "{}").await;

    let err = backend.login("mae@example.com", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        MaeError::Authentication("Incorrect email or password".to_string())
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_login_unauthorized_uses_detail() {
    let (backend, server) = serve_once(401, r#"{"detail":"Compte désactivé"}"#).await;

    let err = backend.login("mae@example.com", "hunter2").await.unwrap_err();
    assert_eq!(err, MaeError::Authentication("Compte désactivé".to_string()));
    server.await.unwrap();
}

#[tokio::test]
async fn test_signup_messages() {
    let (backend, server) = serve_once(200, "{}").await;
    let message = backend.signup("mae@example.com", "hunter2").await.unwrap();
    assert_eq!(message, "Compte créé avec succès");
    server.await.unwrap();

    let (backend, server) = serve_once(201, r#"{"message":"Bienvenue"}"#).await;
    let message = backend.signup("mae@example.com", "hunter2").await.unwrap();
    assert_eq!(message, "Bienvenue");
    server.await.unwrap();

    let (backend, server) = serve_once(409, "").await;
    let err = backend.signup("mae@example.com", "hunter2").await.unwrap_err();
    assert_eq!(
        err,
        MaeError::backend(409, "Erreur lors de la création du compte")
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let backend = HttpBackend::new(&ClientConfig::new(url)).unwrap();
    let err = backend.fetch_all("de10", &credential()).await.unwrap_err();
    assert!(matches!(err, MaeError::Network(_)));
}
