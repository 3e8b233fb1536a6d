mod common;

use chrono::Duration;
use common::compile_str;
use reqwest::Url;
use serde_json::json;
use wayfinder_cli::engine::{build, execute, loader, ArgsBody, HttpTransport, Invocation};
use wayfinder_cli::error::Error;
use wayfinder_cli::links::default_resolver;
use wayfinder_cli::param::ParamValue;
use wayfinder_cli::spec::{EntrypointResolver, OperationCompiler};
use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DESCRIPTION: &str = r"openapi: 3.0.3
info:
  title: Orders
paths:
  /orders:
    get:
      operationId: listOrders
      parameters:
        - name: status
          in: query
          schema: {type: string}
        - name: X-Tenant
          in: header
          schema: {type: string}
    post:
      operationId: createOrder
      requestBody:
        content:
          application/json:
            schema: {type: object}
";

fn transport() -> HttpTransport {
    HttpTransport::new(std::time::Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_execute_decodes_body_and_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(query_param("status", "open"))
        .and(header("X-Tenant", "acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", "</orders?page=2>; rel=\"next\"")
                .set_body_raw(
                    r#"{"items": [{"id": 1, "self": "/orders/1"}], "self": "/orders"}"#,
                    "application/json",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = compile_str(DESCRIPTION).unwrap();
    let mut op = api.operation("list-orders").unwrap().clone();
    op.uri_template = format!("{}/orders", server.uri());

    let invocation = Invocation::default()
        .with_query("status", ParamValue::String("open".into()))
        .with_header("X-Tenant", ParamValue::String("acme".into()));
    let request = build(&op, &invocation, &ArgsBody).unwrap();
    let response = execute(&transport(), &request, default_resolver()).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["items"][0]["id"], json!(1));
    assert_eq!(
        response.links.get("next")[0].uri,
        format!("{}/orders?page=2", server.uri())
    );
    assert_eq!(
        response.links.get("items-item")[0].uri,
        format!("{}/orders/1", server.uri())
    );
    assert_eq!(response.links.get("self")[0].uri, format!("{}/orders", server.uri()));
}

#[tokio::test]
async fn test_execute_sends_body_with_media_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"sku":"A-1"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_raw("id: 7\n", "application/yaml"))
        .expect(1)
        .mount(&server)
        .await;

    let api = compile_str(DESCRIPTION).unwrap();
    let mut op = api.operation("create-order").unwrap().clone();
    op.uri_template = format!("{}/orders", server.uri());

    let request = build(&op, &Invocation::new(vec![r#"{"sku":"A-1"}"#.into()]), &ArgsBody).unwrap();
    let response = execute(&transport(), &request, default_resolver()).await.unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"id": 7}));
    assert!(response.links.is_empty());
}

#[tokio::test]
async fn test_error_statuses_and_odd_bodies_still_return() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("Link", "broken")
                .set_body_raw("{not json", "application/json"),
        )
        .mount(&server)
        .await;

    let api = compile_str(DESCRIPTION).unwrap();
    let mut op = api.operation("list-orders").unwrap().clone();
    op.uri_template = format!("{}/orders", server.uri());

    let request = build(&op, &Invocation::default(), &ArgsBody).unwrap();
    let response = execute(&transport(), &request, default_resolver()).await.unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.body, json!("{not json"));
    assert!(response.links.is_empty());
}

#[tokio::test]
async fn test_load_description_from_url_keeps_cache_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specs/orders.yaml"))
        .and(header_exists("Accept"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Cache-Control", "max-age=300")
                .set_body_raw(DESCRIPTION, "application/yaml"),
        )
        .mount(&server)
        .await;

    let source = format!("{}/specs/orders.yaml", server.uri());
    let loaded = loader::load_description(&source, &transport()).await.unwrap();
    assert_eq!(loaded.location.as_ref().map(Url::as_str), Some(source.as_str()));

    let entrypoint = Url::parse("https://orders.example.com/").unwrap();
    let resolver = EntrypointResolver::new(entrypoint.clone());
    let api = OperationCompiler::new()
        .compile(&loaded.document, &entrypoint, &resolver, &loaded.fetch)
        .unwrap();

    assert_eq!(api.title, "Orders");
    assert_eq!(api.operations.len(), 2);
    assert_eq!(api.cache_until, loaded.fetch.fetched_at + Duration::seconds(300));
}

#[tokio::test]
async fn test_load_description_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, DESCRIPTION.as_bytes()).unwrap();

    let loaded = loader::load_description(file.path().to_str().unwrap(), &transport())
        .await
        .unwrap();
    assert!(loaded.location.is_none());
    assert_eq!(loaded.document["info"]["title"], "Orders");

    let missing = loader::load_description("/nonexistent/openapi.yaml", &transport()).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_discover_tries_well_known_locations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openapi.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DESCRIPTION, "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let entrypoint = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    let loaded = loader::discover(&entrypoint, &transport()).await.unwrap();
    assert_eq!(
        loaded.location.map(String::from),
        Some(format!("{}/openapi.yaml", server.uri()))
    );
}

#[tokio::test]
async fn test_discover_fails_without_a_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let entrypoint = Url::parse(&server.uri()).unwrap();
    let err = loader::discover(&entrypoint, &transport()).await.unwrap_err();
    assert!(matches!(err, Error::DescriptionParse(_)));
}
