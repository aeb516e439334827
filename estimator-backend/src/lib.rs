use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use estimator_core::{
    estimate_drawing, estimate_materials, estimate_wall_materials, Drawing, EstimateError,
    EstimateReport, EstimatorConfig, MaterialEstimate, MaterialProfile, Quantization, WallEstimate,
    WallSpec,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// Limits to keep a single request bounded
pub const MAX_DXF_BYTES: usize = 10 * 1024 * 1024;
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Shared per-process settings; requests may override parts of them.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub config: Arc<EstimatorConfig>,
    pub wall_spec: WallSpec,
}

impl AppState {
    pub fn new(config: EstimatorConfig, wall_spec: WallSpec) -> Self {
        Self {
            config: Arc::new(config),
            wall_spec,
        }
    }

    /// Build settings from `MATERIAL_PROFILE`, `POINT_DECIMALS`, `MAX_ENTITIES`,
    /// `MAX_VERTICES` and `WALL_HEIGHT`.
    pub fn from_env() -> Result<Self> {
        let mut config = EstimatorConfig::default();

        if let Ok(path) = std::env::var("MATERIAL_PROFILE") {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read material profile {}", path))?;
            config.profile = MaterialProfile::from_json(&json)
                .with_context(|| format!("Invalid material profile {}", path))?;
            info!("Loaded material profile from {} ({} materials)", path, config.profile.materials.len());
        }

        if let Ok(decimals) = std::env::var("POINT_DECIMALS") {
            let decimals: u32 = decimals
                .trim()
                .parse()
                .with_context(|| format!("POINT_DECIMALS must be a non-negative integer, got '{}'", decimals))?;
            config.quantization = Quantization::Decimals(decimals);
        }

        if let Ok(max) = std::env::var("MAX_ENTITIES") {
            config.max_entities = max
                .trim()
                .parse()
                .with_context(|| format!("MAX_ENTITIES must be a positive integer, got '{}'", max))?;
        }

        if let Ok(max) = std::env::var("MAX_VERTICES") {
            config.max_vertices = max
                .trim()
                .parse()
                .with_context(|| format!("MAX_VERTICES must be a positive integer, got '{}'", max))?;
        }

        let mut wall_spec = WallSpec::default();
        if let Ok(height) = std::env::var("WALL_HEIGHT") {
            wall_spec.height = height
                .trim()
                .parse()
                .with_context(|| format!("WALL_HEIGHT must be a number, got '{}'", height))?;
            wall_spec.validate().context("Invalid WALL_HEIGHT")?;
        }

        Ok(Self::new(config, wall_spec))
    }

    /// Copy of the process config with the request's overrides applied.
    fn config_with(&self, precision: Option<u32>, profile: Option<MaterialProfile>) -> EstimatorConfig {
        let mut config = (*self.config).clone();
        if precision.is_some() {
            config.quantization = Quantization::from_precision(precision);
        }
        if let Some(profile) = profile {
            config.profile = profile;
        }
        config
    }
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub drawing: Drawing,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub profile: Option<MaterialProfile>,
}

#[derive(Debug, Deserialize)]
pub struct DxfEstimateRequest {
    pub dxf_content: String,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub profile: Option<MaterialProfile>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialsRequest {
    pub area: f64,
    #[serde(default)]
    pub profile: Option<MaterialProfile>,
}

#[derive(Debug, Deserialize)]
pub struct WallMaterialsRequest {
    pub wall_length: f64,
    #[serde(default)]
    pub wall_height: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

// Every EstimateError is a caller contract violation
fn estimate_error(err: EstimateError) -> ApiError {
    warn!("Request rejected: {}", err);
    error_response(StatusCode::BAD_REQUEST, err.code(), err.to_string())
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn estimate_handler(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateReport>, ApiError> {
    info!("Received estimate request with {} entities", request.drawing.len());

    let config = state.config_with(request.precision, request.profile);
    let report = estimate_drawing(&request.drawing, &config).map_err(estimate_error)?;

    Ok(Json(report))
}

async fn estimate_dxf_handler(
    State(state): State<AppState>,
    Json(request): Json<DxfEstimateRequest>,
) -> Result<Json<EstimateReport>, ApiError> {
    info!("Received DXF estimate request with {} bytes", request.dxf_content.len());

    if request.dxf_content.len() > MAX_DXF_BYTES {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "INPUT_TOO_LARGE",
            format!("DXF content too large. Maximum {} bytes allowed.", MAX_DXF_BYTES),
        ));
    }
    if request.dxf_content.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "EMPTY_DXF",
            "DXF content cannot be empty",
        ));
    }

    let drawing = dxf_loader::read_dxf_str(&request.dxf_content).map_err(|e| {
        warn!("DXF parse failed: {}", e);
        error_response(StatusCode::BAD_REQUEST, "INVALID_DXF", format!("Failed to parse DXF: {}", e))
    })?;

    let config = state.config_with(request.precision, request.profile);
    let report = estimate_drawing(&drawing, &config).map_err(estimate_error)?;

    Ok(Json(report))
}

async fn materials_handler(
    State(state): State<AppState>,
    Json(request): Json<MaterialsRequest>,
) -> Result<Json<MaterialEstimate>, ApiError> {
    let profile = request.profile.unwrap_or_else(|| state.config.profile.clone());
    let estimate = estimate_materials(request.area, &profile).map_err(estimate_error)?;

    Ok(Json(estimate))
}

async fn wall_materials_handler(
    State(state): State<AppState>,
    Json(request): Json<WallMaterialsRequest>,
) -> Result<Json<WallEstimate>, ApiError> {
    let mut spec = state.wall_spec;
    if let Some(height) = request.wall_height {
        spec.height = height;
    }
    let estimate = estimate_wall_materials(request.wall_length, &spec).map_err(estimate_error)?;

    Ok(Json(estimate))
}

fn cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8080,http://127.0.0.1:8080".to_string());

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/estimate", post(estimate_handler))
        .route("/estimate/dxf", post(estimate_dxf_handler))
        .route("/materials", post(materials_handler))
        .route("/materials/wall", post(wall_materials_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
