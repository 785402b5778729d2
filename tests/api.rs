use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use biblioteca_db::{InMemoryStore, LibraryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    store: Arc<InMemoryStore>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let router = biblioteca::app(store.clone()).unwrap();
        Self { store, router }
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        self.raw(method, uri, body).await
    }

    async fn raw(&self, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    async fn response(&self, method: &str, uri: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn create_autor(&self, nombre: &str, biografia: i64) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/autor",
                Some(json!({ "nombre": nombre, "biografia": biografia })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_libro(&self, titulo: &str, autores: &[&str], copias: i64) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/libro",
                Some(json!({ "titulo": titulo, "autores": autores, "copias": copias })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn count(&self) -> u64 {
        self.store.count_libros().await.unwrap()
    }
}

#[tokio::test]
async fn create_author_echoes_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "POST",
            "/autor",
            Some(json!({ "nombre": "Carmen Laforet", "biografia": 1921 })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["nombre"], "Carmen Laforet");
    assert_eq!(body["biografia"], 1921);
}

#[tokio::test]
async fn create_author_requires_both_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .request("POST", "/autor", Some(json!({ "nombre": "Sin biografía" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "biografia");
}

#[tokio::test]
async fn round_trip_hydrates_existing_authors_only() {
    let app = TestApp::new();
    let a1 = app.create_autor("Rosalía de Castro", 1837).await;
    let ghost = "65f1c0ffee65f1c0ffee65f1";

    let (status, created) = app
        .request(
            "POST",
            "/libro",
            Some(json!({ "titulo": "T", "autores": [a1, ghost], "copias": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["titulo"], "T");
    assert_eq!(created["autores"], json!([a1, ghost]));
    assert_eq!(created["copias"], 3);

    let id = created["id"].as_str().unwrap();
    let (status, libro) = app.request("GET", &format!("/libro?id={id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(libro["id"], id);
    assert_eq!(libro["titulo"], "T");
    assert_eq!(libro["copias"], 3);
    assert_eq!(
        libro["autores"],
        json!([{ "id": a1, "nombre": "Rosalía de Castro", "biografia": 1837 }])
    );
}

#[tokio::test]
async fn book_with_only_unknown_authors_is_accepted() {
    let app = TestApp::new();

    let id = app.create_libro("Huérfano", &["nadie", "tampoco"], 1).await;
    let (status, libro) = app.request("GET", &format!("/libro?id={id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(libro["autores"], json!([]));
}

#[tokio::test]
async fn create_book_without_copias_creates_nothing() {
    let app = TestApp::new();
    let before = app.count().await;

    let (status, body) = app
        .request(
            "POST",
            "/libro",
            Some(json!({ "titulo": "Sin copias", "autores": [] })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(app.count().await, before);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = TestApp::new();

    let (status, _) = app.raw("POST", "/libro", Body::from("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/libro",
            Some(json!({ "titulo": "T", "autores": [], "copias": "tres" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn list_filters_by_exact_title() {
    let app = TestApp::new();
    app.create_libro("Marianela", &[], 1).await;
    app.create_libro("marianela", &[], 1).await;
    app.create_libro("Marianela II", &[], 1).await;

    let (status, body) = app.request("GET", "/libros?titulo=Marianela", None).await;
    assert_eq!(status, StatusCode::OK);
    let libros = body.as_array().unwrap();
    assert_eq!(libros.len(), 1);
    assert_eq!(libros[0]["titulo"], "Marianela");

    let (_, body) = app.request("GET", "/libros", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn list_is_an_empty_array_when_nothing_matches() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/libros?titulo=Nada", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn listed_books_are_hydrated() {
    let app = TestApp::new();
    let autor = app.create_autor("Miguel Delibes", 1920).await;
    app.create_libro("El camino", &[&autor], 5).await;

    let (_, body) = app.request("GET", "/libros", None).await;
    assert_eq!(body[0]["autores"][0]["nombre"], "Miguel Delibes");
}

#[tokio::test]
async fn get_requires_id() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/libro", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Introduce id");
}

#[tokio::test]
async fn repeated_id_parameter_is_a_structured_bad_request() {
    let app = TestApp::new();

    for method in ["GET", "PUT", "DELETE"] {
        let (status, body) = app.request(method, "/libro?id=a&id=b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(body["error"]["code"], "bad_request", "{method}");
    }
}

#[tokio::test]
async fn get_unknown_book_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/libro?id=desconocido", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Libro no encontrado.");
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let app = TestApp::new();
    let autor = app.create_autor("Emilia Pardo Bazán", 1851).await;
    let id = app.create_libro("Borrador", &[], 1).await;

    let (status, body) = app
        .request(
            "PUT",
            &format!("/libro?id={id}"),
            Some(json!({ "titulo": "Los pazos de Ulloa", "autores": [autor], "copias": 7 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": id, "titulo": "Los pazos de Ulloa", "autor": [autor], "copias": 7 })
    );

    let (_, libro) = app.request("GET", &format!("/libro?id={id}"), None).await;
    assert_eq!(libro["titulo"], "Los pazos de Ulloa");
    assert_eq!(libro["copias"], 7);
    assert_eq!(libro["autores"][0]["id"], autor);
}

#[tokio::test]
async fn update_accepts_id_in_body() {
    let app = TestApp::new();
    let id = app.create_libro("Antes", &[], 1).await;

    let (status, body) = app
        .request(
            "PUT",
            "/libro",
            Some(json!({ "id": id, "titulo": "Después", "autores": [], "copias": 2 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["titulo"], "Después");
}

#[tokio::test]
async fn identical_update_still_succeeds() {
    let app = TestApp::new();
    let id = app.create_libro("Igual", &[], 2).await;
    let payload = json!({ "titulo": "Igual", "autores": [], "copias": 2 });

    let (status, _) = app
        .request("PUT", &format!("/libro?id={id}"), Some(payload))
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_of_unknown_book_is_not_found_and_changes_nothing() {
    let app = TestApp::new();
    let id = app.create_libro("Intacto", &[], 1).await;

    let (status, body) = app
        .request(
            "PUT",
            "/libro?id=no-existe",
            Some(json!({ "titulo": "Otro", "autores": [], "copias": 9 })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "El ID del libro no existe.");
    assert_eq!(app.count().await, 1);
    let stored = app.store.find_libro(&id).await.unwrap().unwrap();
    assert_eq!(stored.titulo, "Intacto");
    assert_eq!(stored.copias, 1);
}

#[tokio::test]
async fn update_without_id_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "PUT",
            "/libro",
            Some(json!({ "titulo": "T", "autores": [], "copias": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "id");
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let app = TestApp::new();
    let id = app.create_libro("Efímero", &[], 1).await;

    let (status, body) = app
        .request("DELETE", &format!("/libro?id={id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Libro eliminado exitosamente.".to_string()));

    let (status, _) = app
        .request("DELETE", &format!("/libro?id={id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn delete_accepts_bare_id_body() {
    let app = TestApp::new();
    let id = app.create_libro("Legado", &[], 1).await;

    let (status, _) = app.request("DELETE", "/libro", Some(json!(id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn delete_without_id_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.request("DELETE", "/libro", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Introduce id");
}

#[tokio::test]
async fn unmatched_routes_are_endpoint_not_found() {
    let app = TestApp::new();

    for (method, uri) in [("GET", "/autores"), ("PATCH", "/libro"), ("GET", "/autor")] {
        let (status, body) = app.request(method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"]["message"], "Endpoint not found");
    }
}

#[tokio::test]
async fn unmatched_routes_carry_request_id() {
    let app = TestApp::new();

    for (method, uri) in [("GET", "/nope"), ("PATCH", "/libro")] {
        let response = app.response(method, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        assert!(
            response.headers().contains_key("x-request-id"),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn mixed_case_author_references_are_hydrated() {
    let app = TestApp::new();
    let autor = app.create_autor("Benito Pérez Galdós", 1843).await;
    let upper = autor.to_uppercase();
    let id = app.create_libro("Marianela", &[&upper], 2).await;

    let (status, body) = app.request("GET", &format!("/libro?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["autores"].as_array().unwrap().len(), 1);
    assert_eq!(body["autores"][0]["id"], autor.as_str());
    assert_eq!(body["autores"][0]["nombre"], "Benito Pérez Galdós");
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let app = TestApp::new();
    app.store.close().await;

    let (status, body) = app.request("GET", "/libros", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "internal_error");
}

#[tokio::test]
async fn openapi_document_lists_every_route() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/libros", "/libro", "/autor", "/healthz"] {
        assert!(body["paths"][path].is_object(), "missing {path}");
    }
}
