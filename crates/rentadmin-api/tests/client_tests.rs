// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rentadmin_api::{Client, ListQuery, backend};
use rentadmin_app::{
    CollaboratorError, Completion, EntityRequest, FailureKind, ResourceKind, Tenant,
    TenantFormInput,
};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_response(status: u16, body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());
    Ok((server, addr))
}

const TENANT_JSON: &str = r#"{
    "id": 5,
    "first_name": "Juan",
    "last_name": "Pérez",
    "email": "juan@example.com",
    "phone": "999 111 222",
    "document_number": "40112233",
    "notes": "",
    "created_at": "2026-01-10T12:00:00Z",
    "updated_at": null
}"#;

#[test]
fn list_unwraps_page_and_sends_query() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/tenants?page=1&size=1000&q=juan");
        let body = format!(
            r#"{{"success":true,"data":{{"items":[{TENANT_JSON}],"total":1,"page":1,"size":1000}}}}"#
        );
        request
            .respond(json_response(200, &body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let query = ListQuery {
        search: Some("juan".to_owned()),
        ..ListQuery::first_page(1000)
    };
    let page = client.list::<Tenant>(ResourceKind::Tenants, &query)?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].full_name(), "Juan Pérez");
    assert!(page.items[0].created_at.is_some());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn create_posts_json_with_bearer_token() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(*request.method(), Method::Post);
        assert_eq!(request.url(), "/api/tenants");
        let auth = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Authorization"))
            .map(|header| header.value.as_str().to_owned());
        assert_eq!(auth.as_deref(), Some("Bearer s3cret"));

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("body should be readable");
        let sent: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(sent["first_name"], "Juan");
        assert!(sent.get("id").is_none());

        let reply = format!(r#"{{"success":true,"data":{TENANT_JSON}}}"#);
        request
            .respond(json_response(201, &reply))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), Some("s3cret".to_owned()))?;
    let form = TenantFormInput {
        first_name: "Juan".to_owned(),
        last_name: "Pérez".to_owned(),
        ..TenantFormInput::blank()
    };
    let created: Tenant = client.create(ResourceKind::Tenants, &form)?;
    assert_eq!(created.id.get(), 5);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unsuccessful_envelope_is_a_business_error() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(*request.method(), Method::Put);
        assert_eq!(request.url(), "/api/tenants/5");
        request
            .respond(json_response(
                200,
                r#"{"success":false,"message":"email already registered"}"#,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let error = client
        .update::<Tenant, _>(ResourceKind::Tenants, 5, &TenantFormInput::blank())
        .expect_err("update should be rejected");
    assert_eq!(error.kind(), FailureKind::Business);
    assert!(error.detail().contains("email already registered"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn client_errors_are_business_and_server_errors_are_transport() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let first = server.recv().expect("request expected");
        first
            .respond(json_response(
                404,
                r#"{"success":false,"error":"tenant not found"}"#,
            ))
            .expect("response should succeed");
        let second = server.recv().expect("request expected");
        second
            .respond(json_response(503, "upstream down"))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let missing = client
        .get::<Tenant>(ResourceKind::Tenants, 99)
        .expect_err("404 should fail");
    assert_eq!(missing.kind(), FailureKind::Business);
    assert!(missing.detail().contains("tenant not found"));

    let down = client
        .get::<Tenant>(ResourceKind::Tenants, 99)
        .expect_err("503 should fail");
    assert!(down.is_retryable());
    assert!(down.detail().contains("503"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_accepts_null_data_and_undecodable_bodies_are_transport() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let first = server.recv().expect("request expected");
        assert_eq!(*first.method(), Method::Delete);
        assert_eq!(first.url(), "/api/properties/3");
        first
            .respond(json_response(200, r#"{"success":true,"data":null}"#))
            .expect("response should succeed");
        let second = server.recv().expect("request expected");
        second
            .respond(json_response(200, "<html>oops</html>"))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    client.delete(ResourceKind::Properties, 3)?;
    let garbled = client
        .delete(ResourceKind::Properties, 3)
        .expect_err("non-json body should fail");
    assert!(matches!(garbled, CollaboratorError::Transport(_)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_server_is_transport_and_ping_is_actionable() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50), None)?;
    let error = client
        .list::<Tenant>(ResourceKind::Tenants, &ListQuery::first_page(10))
        .expect_err("unreachable endpoint should fail");
    assert_eq!(error.kind(), FailureKind::Transport);

    let ping = client.ping().expect_err("ping should fail");
    assert!(ping.to_string().contains("is the server running"));
    Ok(())
}

#[test]
fn backend_executes_engine_requests() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/tenants?page=1&size=25");
        let body = format!(
            r#"{{"success":true,"data":{{"items":[{TENANT_JSON},{TENANT_JSON}],"total":2,"page":1,"size":25}}}}"#
        );
        request
            .respond(json_response(200, &body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let tenants = backend::<Tenant, TenantFormInput>(&client, ResourceKind::Tenants, 25);
    let completion = tenants.execute(&EntityRequest::Load { token: 7 });
    let Completion::Loaded { token, result } = completion else {
        panic!("load request should produce a load completion");
    };
    assert_eq!(token, 7);
    assert_eq!(result?.items.len(), 2);

    handle.join().expect("server thread should join");
    Ok(())
}
