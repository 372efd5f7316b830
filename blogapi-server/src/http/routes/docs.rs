//! API documentation: OpenAPI 3 document and a Swagger UI page
//!
//! Component schemas come from the `JsonSchema` derives on the request and
//! response types. Paths are listed by hand and reference those components.

use std::sync::Arc;

use axum::{response::Html, routing::get, Json, Router};
use schemars::gen::SchemaSettings;
use serde_json::{json, Value};

use super::health::{HealthResponse, LivenessResponse};
use super::posts::{CreatePostRequest, UpdatePostRequest};
use crate::github::{GithubRepoSummary, REPOS_PER_PAGE};
use crate::http::error::ErrorBody;
use crate::http::server::AppState;
use crate::models::Post;

const SWAGGER_UI: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Blog API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: '/api-json', dom_id: '#swagger-ui' });
    };
  </script>
</body>
</html>
"#;

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn ok(description: &str, schema: Value) -> Value {
    json!({ "description": description, "content": json_content(schema) })
}

fn error(description: &str) -> Value {
    ok(description, schema_ref("ErrorBody"))
}

fn id_param() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int32" }
    })
}

fn path_param(name: &str) -> Value {
    json!({ "name": name, "in": "path", "required": true, "schema": { "type": "string" } })
}

/// Build the OpenAPI 3 document served at `/api-json`.
pub fn openapi_document() -> Value {
    let mut gen = SchemaSettings::openapi3().into_generator();
    gen.subschema_for::<Post>();
    gen.subschema_for::<CreatePostRequest>();
    gen.subschema_for::<UpdatePostRequest>();
    gen.subschema_for::<GithubRepoSummary>();
    gen.subschema_for::<ErrorBody>();
    gen.subschema_for::<LivenessResponse>();
    gen.subschema_for::<HealthResponse>();
    let schemas = gen.take_definitions();

    let post = schema_ref("Post");
    let posts = json!({ "type": "array", "items": post });
    let repo = schema_ref("GithubRepoSummary");
    let repos = json!({ "type": "array", "items": repo });
    let list_note = format!("Only the first {} repositories are returned.", REPOS_PER_PAGE);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Blog API",
            "description": "Blog posts with tags, plus a read-through proxy for GitHub repository metadata.",
            "version": env!("CARGO_PKG_VERSION")
        },
        "tags": [
            { "name": "health" },
            { "name": "posts" },
            { "name": "github" }
        ],
        "paths": {
            "/": {
                "get": {
                    "tags": ["health"],
                    "summary": "Liveness check",
                    "responses": { "200": ok("Service is running", schema_ref("LivenessResponse")) }
                }
            },
            "/health": {
                "get": {
                    "tags": ["health"],
                    "summary": "Health and uptime",
                    "responses": { "200": ok("Service is healthy", schema_ref("HealthResponse")) }
                }
            },
            "/posts": {
                "get": {
                    "tags": ["posts"],
                    "summary": "List all posts, newest first",
                    "responses": { "200": ok("All posts", posts.clone()) }
                },
                "post": {
                    "tags": ["posts"],
                    "summary": "Create a post",
                    "requestBody": { "required": true, "content": json_content(schema_ref("CreatePostRequest")) },
                    "responses": {
                        "201": ok("Created post", post.clone()),
                        "400": error("Invalid request body")
                    }
                }
            },
            "/posts/published": {
                "get": {
                    "tags": ["posts"],
                    "summary": "List published posts, newest first",
                    "responses": { "200": ok("Published posts", posts) }
                }
            },
            "/posts/{id}": {
                "parameters": [id_param()],
                "get": {
                    "tags": ["posts"],
                    "summary": "Get a post",
                    "responses": {
                        "200": ok("The post", post.clone()),
                        "400": error("Id is not an integer"),
                        "404": error("No such post")
                    }
                },
                "patch": {
                    "tags": ["posts"],
                    "summary": "Update a post; a provided tags array replaces all tags",
                    "requestBody": { "required": true, "content": json_content(schema_ref("UpdatePostRequest")) },
                    "responses": {
                        "200": ok("Updated post", post),
                        "400": error("Invalid request body or id"),
                        "404": error("No such post")
                    }
                },
                "delete": {
                    "tags": ["posts"],
                    "summary": "Delete a post; tags are kept",
                    "responses": {
                        "204": { "description": "Deleted" },
                        "400": error("Id is not an integer"),
                        "404": error("No such post")
                    }
                }
            },
            "/github/repositories": {
                "get": {
                    "tags": ["github"],
                    "summary": "List repositories for a user, or the configured default user",
                    "description": list_note,
                    "parameters": [{
                        "name": "username",
                        "in": "query",
                        "required": false,
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": ok("Repositories, most recently updated first", repos.clone()),
                        "400": error("No username given and none configured"),
                        "403": error("GitHub rate limit reached"),
                        "404": error("User does not exist")
                    }
                }
            },
            "/github/repositories/{username}": {
                "get": {
                    "tags": ["github"],
                    "summary": "List repositories for a user",
                    "description": list_note,
                    "parameters": [path_param("username")],
                    "responses": {
                        "200": ok("Repositories, most recently updated first", repos),
                        "403": error("GitHub rate limit reached"),
                        "404": error("User does not exist")
                    }
                }
            },
            "/github/repositories/{username}/{repo}": {
                "get": {
                    "tags": ["github"],
                    "summary": "Get one repository",
                    "parameters": [path_param("username"), path_param("repo")],
                    "responses": {
                        "200": ok("The repository", repo),
                        "404": error("Repository does not exist")
                    }
                }
            }
        },
        "components": { "schemas": schemas }
    })
}

/// GET /api
async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

/// GET /api-json
async fn openapi_json() -> Json<Value> {
    Json(openapi_document())
}

/// Documentation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", get(swagger_ui))
        .route("/api-json", get(openapi_json))
}
