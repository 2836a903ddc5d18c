//! End-to-end tests for the full client over real HTTP (`mockito`).
//!
//! Mocks that share a path are told apart by the session cookie, so each
//! one sees exactly the request it's meant for.

use mockito::Matcher;
use registrar::prelude::*;
use registrar::ReqwestTransport;

type Client = RegistrarClient<ReqwestTransport, fn(&str)>;

fn no_navigation(_: &str) {}

fn client(server: &mockito::Server) -> Client {
    RegistrarClientBuilder::new()
        .base_url(&format!("{}/api", server.url()))
        .build(no_navigation as fn(&str))
        .expect("client should build")
}

#[tokio::test]
async fn test_expired_credential_refreshes_and_replays_over_http() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("GET", "/api/students/")
        .match_query(Matcher::UrlEncoded("level".into(), "2".into()))
        .match_header("cookie", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"detail":"Given token not valid for any token type"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh/")
        .with_status(200)
        .with_header("set-cookie", "access_token=fresh; Path=/; HttpOnly")
        .with_body(r#"{"message":"Token refreshed"}"#)
        .expect(1)
        .create_async()
        .await;
    let replayed = server
        .mock("GET", "/api/students/")
        .match_query(Matcher::UrlEncoded("level".into(), "2".into()))
        .match_header("cookie", Matcher::Regex("access_token=fresh".into()))
        .with_status(200)
        .with_body(r#"[{"id":3,"name":"Lina","academic_level":2}]"#)
        .expect(1)
        .create_async()
        .await;
    let client = client(&server);

    let envelope = client
        .gateway()
        .students(&StudentQuery {
            level: Some(2),
            ..StudentQuery::default()
        })
        .await
        .expect("replay should succeed");

    rejected.assert_async().await;
    refresh.assert_async().await;
    replayed.assert_async().await;
    assert_eq!(
        envelope.payload(),
        Some(&serde_json::json!([{"id": 3, "name": "Lina", "academic_level": 2}]))
    );
    assert!(!client.state().expired);
}

#[tokio::test]
async fn test_sign_in_cookie_is_used_by_bootstrap() {
    let mut server = mockito::Server::new_async().await;
    let user = r#"{"id":1,"username":"admin","email":"admin@school.test","is_superuser":true}"#;
    let login = server
        .mock("POST", "/api/auth/login/")
        .match_body(Matcher::JsonString(
            r#"{"username":"admin","password":"secret"}"#.into(),
        ))
        .with_status(200)
        .with_header("set-cookie", "access_token=abc; Path=/; HttpOnly")
        .with_body(format!(r#"{{"message":"Login successful","user":{user}}}"#))
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/api/auth/me/")
        .match_header("cookie", Matcher::Regex("access_token=abc".into()))
        .with_status(200)
        .with_body(user)
        .expect(1)
        .create_async()
        .await;
    let client = client(&server);

    let signed_in = client
        .sign_in(&Credentials::new("admin", "secret"))
        .await
        .expect("sign-in should succeed");
    let restored = client.bootstrap().await;

    login.assert_async().await;
    me.assert_async().await;
    assert_eq!(restored, Some(signed_in));
    assert!(client.state().is_authenticated());
}

#[tokio::test]
async fn test_delete_no_content_over_http() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", "/api/contact-messages/12/")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let client = client(&server);

    let envelope = client
        .gateway()
        .delete_contact_message(12)
        .await
        .expect("delete should succeed");

    delete.assert_async().await;
    assert_eq!(envelope, ResponseEnvelope::NoContent);
}

#[tokio::test]
async fn test_rejected_payment_surfaces_service_message() {
    let mut server = mockito::Server::new_async().await;
    let pay = server
        .mock("POST", "/api/pay/")
        .with_status(400)
        .with_body(r#"{"error":"Installment already paid"}"#)
        .expect(1)
        .create_async()
        .await;
    let client = client(&server);

    let err = client
        .gateway()
        .create_payment(&NewPayment::new(4, 1))
        .await
        .expect_err("payment should be rejected");

    pay.assert_async().await;
    assert_eq!(err.to_string(), "Installment already paid");
    assert_eq!(err.status(), Some(400));
}
