//! Integration tests for the reqwest transport.
//!
//! These tests run against a real HTTP server (`mockito`) to verify that
//! status codes and bodies come back untouched and that the cookie jar
//! carries the credential between requests.

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use mockito::Matcher;
    use registrar_transport::{
        HttpTransport, Method, RawRequest, ReqwestTransport, TransportError,
    };

    fn request(method: Method, url: String) -> RawRequest {
        RawRequest {
            method,
            url,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
            with_credentials: true,
        }
    }

    #[tokio::test]
    async fn test_send_returns_status_and_body_for_error_responses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/students/")
            .with_status(404)
            .with_body(r#"{"detail":"Not found."}"#)
            .expect(1)
            .create_async()
            .await;
        let transport = ReqwestTransport::new().expect("transport should build");

        let response = transport
            .send(request(Method::Get, format!("{}/api/students/", server.url())))
            .await
            .expect("a 404 is still a response");

        mock.assert_async().await;
        assert_eq!(response.status, 404);
        assert_eq!(response.body, br#"{"detail":"Not found."}"#);
    }

    #[tokio::test]
    async fn test_send_forwards_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/pay/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::JsonString(
                r#"{"student_id":4,"installment_number":1,"amount":100}"#.into(),
            ))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let transport = ReqwestTransport::new().expect("transport should build");
        let mut raw = request(Method::Post, format!("{}/api/pay/", server.url()));
        raw.body =
            Some(br#"{"student_id":4,"installment_number":1,"amount":100}"#.to_vec());

        let response = transport.send(raw).await.expect("should send");

        mock.assert_async().await;
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_cookie_set_by_server_is_carried_on_next_request() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/auth/login/")
            .with_status(200)
            .with_header("set-cookie", "access_token=abc123; Path=/; HttpOnly")
            .with_body(r#"{"message":"Login successful"}"#)
            .expect(1)
            .create_async()
            .await;
        let me = server
            .mock("GET", "/api/auth/me/")
            .match_header("cookie", Matcher::Regex("access_token=abc123".into()))
            .with_status(200)
            .with_body(r#"{"id":1,"username":"admin"}"#)
            .expect(1)
            .create_async()
            .await;
        let transport = ReqwestTransport::new().expect("transport should build");

        transport
            .send(request(Method::Post, format!("{}/api/auth/login/", server.url())))
            .await
            .expect("login should send");
        let response = transport
            .send(request(Method::Get, format!("{}/api/auth/me/", server.url())))
            .await
            .expect("me should send");

        login.assert_async().await;
        me.assert_async().await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_send_to_closed_port_is_send_failure() {
        let transport = ReqwestTransport::new().expect("transport should build");

        // Port 9 (discard) on localhost is essentially never listening.
        let result = transport
            .send(request(Method::Get, "http://127.0.0.1:9/api/auth/me/".into()))
            .await;

        assert!(matches!(result, Err(TransportError::SendFailed(_))));
    }
}
