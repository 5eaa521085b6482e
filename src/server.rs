//! HTTP surface: one `POST /{package}/generate` route per package

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::Error;
use crate::package::PackageService;
use crate::request::{
  request_from_body, GenerationConfig, ParameterSpec, RequestBody
};

impl Error
{   pub fn status_code(&self) -> StatusCode
    {   match self
        {   Error::InvalidRequest(_) => StatusCode::BAD_REQUEST
          , Error::UnknownPackage(_) => StatusCode::NOT_FOUND
          , Error::Timeout => StatusCode::GATEWAY_TIMEOUT
          , _ => StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
struct AppState
{   services: Arc<IndexMap<&'static str, PackageService>>
}

/// Public description of a package, served at `GET /packages`
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo
{   pub name: &'static str
  , pub description: &'static str
  , pub plugin: &'static str
  , pub config: GenerationConfig
  , pub parameters: Vec<ParameterSpec>
}

impl From<&PackageService> for PackageInfo
{   fn from(service: &PackageService) -> Self
    {   let package = service.package();
        PackageInfo
        {   name: package.name()
          , description: package.description()
          , plugin: package.plugin()
          , config: package.config()
          , parameters: package.parameters()
        }
    }
}

/// Build the router serving every given package
pub fn router(services: Vec<PackageService>) -> Router
{   let services: IndexMap<&'static str, PackageService> = services
      .into_iter()
      .map(|s| (s.package().name(), s))
      .collect();
    debug!(
      "Routing packages: {:?}",
      services.keys().collect::<Vec<_>>()
    );

    Router::new()
      .route("/health", get(health))
      .route("/packages", get(list_packages))
      .route("/{package}/generate", post(generate))
      .with_state(AppState { services: Arc::new(services) })
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(
  listener: TcpListener
, router: Router
, shutdown: F
) -> Result<(), Error>
where F: Future<Output = ()> + Send + 'static
{   if let Ok(addr) = listener.local_addr()
    {   info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router)
      .with_graceful_shutdown(shutdown)
      .await
      .map_err(|e| Error::Other(format!("server error: {}", e)))?;
    info!("Server stopped");
    Ok(())
}

async fn health() -> &'static str
{   "ok"
}

async fn list_packages(
  State(state): State<AppState>
) -> Json<Vec<PackageInfo>>
{   Json(state.services.values().map(PackageInfo::from).collect())
}

async fn generate(
  State(state): State<AppState>
, Path(package): Path<String>
, body: Result<Json<RequestBody>, JsonRejection>
) -> Result<Json<String>, Error>
{   let service = state.services
      .get(package.as_str())
      .ok_or_else(|| Error::UnknownPackage(package.clone()))?;

    let Json(body) = body.map_err(|rejection| {
      Error::InvalidRequest(rejection.body_text())
    })?;
    let request = request_from_body(body);

    debug!("POST /{}/generate with {} parameters", package, request.len());
    let text = service.generate(&request).await?;
    Ok(Json(text))
}
