#![allow(dead_code)]

use aq_core::measurement::{Coordinate, Measurement};
use aq_core::parameter::Parameter;
use aq_core::sample::SampleDataset;
use aq_core::source::{PollutantSource, UpstreamError};
use aq_db::models::UserProfile;
use aq_db::MemoryProfileStore;
use aq_server::{build_router, AirQualityService, AppState, PrefixTokenIdentity, ServerConfig};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const TOKEN: &str = "Bearer demo-token-u1";

/// A source that answers every call with the same result and records what it was asked.
pub struct ScriptedSource {
    result: Result<Vec<Measurement>, UpstreamError>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(Coordinate, u32)>>,
}

impl ScriptedSource {
    pub fn new(result: Result<Vec<Measurement>, UpstreamError>) -> Arc<Self> {
        Arc::new(ScriptedSource {
            result,
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn stalled() -> Arc<Self> {
        Arc::new(ScriptedSource {
            result: Ok(Vec::new()),
            delay: Some(Duration::from_secs(30)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_call(&self) -> Option<(Coordinate, u32)> {
        self.calls.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl PollutantSource for ScriptedSource {
    fn id(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_measurements(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Measurement>, UpstreamError> {
        self.calls.lock().unwrap().push((center, radius_meters));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

pub fn measurement(parameter: Parameter, value: f64, lat: f64, lng: f64) -> Measurement {
    Measurement {
        parameter,
        value,
        unit: "µg/m³".to_string(),
        timestamp: None,
        coordinate: Some(Coordinate::new(lat, lng)),
        site_id: None,
    }
}

pub fn app_with(source: Arc<dyn PollutantSource>, profiles: Vec<UserProfile>) -> Router {
    let service = AirQualityService::new(
        source,
        Arc::new(SampleDataset::bundled().clone()),
        Duration::from_millis(200),
    );
    let state = AppState::new(
        service,
        Arc::new(MemoryProfileStore::with_profiles(profiles)),
        Arc::new(PrefixTokenIdentity::new("demo-token-")),
        ServerConfig::default(),
    );
    build_router(state)
}

pub fn app(source: Arc<dyn PollutantSource>) -> Router {
    app_with(source, Vec::new())
}

pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(auth) = auth {
        request = request.header("authorization", auth);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Method::GET, path, Some(TOKEN), None).await
}
