use axum::{Json, extract::State};
use goalkeepr_core::store::GoalkeeprStore;
use serde_json::{Value, json};

use crate::AppState;

/// `GET /healthz`: liveness plus the environment and build version.
pub async fn healthz<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: GoalkeeprStore + Clone + 'static,
{
  Json(json!({
    "status": "available",
    "system_info": {
      "env":     state.config.env.as_str(),
      "version": env!("CARGO_PKG_VERSION"),
    },
  }))
}
