//! Mock Tibber endpoint for exercising the client over real HTTP.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "secret-token";

/// Start a server answering one authenticated GraphQL POST to `/gql` with a canned response.
///
/// Requests without the bearer token or query fall through to wiremock's 404.
pub async fn graphql_server(
    query: &str,
    status: u16,
    content_type: &str,
    body: &str,
) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gql"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(body_partial_json(json!({ "query": query })))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_owned(), content_type))
        .expect(1)
        .mount(&server)
        .await;
    server
}

pub fn endpoint(server: &MockServer) -> String {
    format!("{}/gql", server.uri())
}
