//! Router builder for the HTTP server

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use biblioteca_kernel::ModuleRegistry;

use crate::error::AppError;

/// Builder for constructing the main HTTP router.
///
/// Routes must be added before the first middleware layer: the 404
/// fallbacks are installed right before it so that layers wrap them too.
pub struct RouterBuilder {
    router: Router,
    openapi_fragments: Vec<serde_json::Value>,
    fallbacks_installed: bool,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            openapi_fragments: Vec::new(),
            fallbacks_installed: false,
        }
    }

    /// Unknown paths and unsupported methods answer "Endpoint not found"
    fn install_fallbacks(&mut self) {
        if self.fallbacks_installed {
            return;
        }
        self.router = std::mem::take(&mut self.router)
            .method_not_allowed_fallback(endpoint_not_found)
            .fallback(endpoint_not_found);
        self.fallbacks_installed = true;
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's router at the root and remember its OpenAPI fragment
    pub fn merge_module(
        mut self,
        module_router: Router,
        openapi: Option<serde_json::Value>,
    ) -> Self {
        self.router = self.router.merge(module_router);
        self.openapi_fragments.extend(openapi);
        self
    }

    /// Merge every registered module
    pub fn with_modules(mut self, registry: &ModuleRegistry) -> Self {
        for module in registry.modules() {
            tracing::info!(module = module.name(), "mounting module routes");
            self = self.merge_module(module.routes(), module.openapi());
        }
        self
    }

    /// Serve the merged OpenAPI document at `/docs/openapi.json`
    pub fn with_openapi(mut self) -> Self {
        let spec = merge_openapi(&self.openapi_fragments);

        if let Err(err) = serde_json::from_value::<utoipa::openapi::OpenApi>(spec.clone()) {
            tracing::warn!(error = %err, "merged OpenAPI document does not validate");
        }

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(spec.clone()) }),
        );
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.install_fallbacks();
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.install_fallbacks();
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back in `x-request-id`
    pub fn with_request_id(mut self) -> Self {
        self.install_fallbacks();
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Build the final router
    pub fn build(mut self) -> Router {
        self.install_fallbacks();
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn endpoint_not_found() -> AppError {
    AppError::not_found("Endpoint not found")
}

fn merge_openapi(fragments: &[serde_json::Value]) -> serde_json::Value {
    let mut spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Biblioteca API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Books and authors over MongoDB"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Health check",
                    "responses": { "200": { "description": "OK" } }
                }
            }
        },
        "components": {
            "schemas": {
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "message": { "type": "string" },
                                "details": { "type": "array", "items": {} },
                                "trace_id": { "type": "string" },
                                "timestamp": { "type": "string" }
                            },
                            "required": ["code", "message", "trace_id", "timestamp"]
                        }
                    },
                    "required": ["error"]
                }
            }
        }
    });

    for fragment in fragments {
        if let Some(paths) = fragment.get("paths").and_then(|p| p.as_object()) {
            for (path, item) in paths {
                spec["paths"][path] = item.clone();
            }
        }

        let schemas = fragment
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object());
        if let Some(schemas) = schemas {
            for (name, schema) in schemas {
                spec["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    spec
}
