use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::DatasetSettings;
use crate::core::{MatchError, MatchOutcome, Matcher, RandomSampler, SideSampler};
use crate::models::{ErrorResponse, HealthResponse, RunDatasetRequest, RunMatchingRequest, RunMatchingResponse};
use crate::services::{Dataset, DatasetError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
    pub dataset: Option<DatasetSettings>,
    pub max_population: usize,
}

/// Configure all pairing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/pairings/run", web::post().to(run_pairing))
        .route("/pairings/dataset", web::post().to(run_dataset));
}

impl From<MatchOutcome> for RunMatchingResponse {
    fn from(outcome: MatchOutcome) -> Self {
        let unmatched = outcome.unmatched();
        Self {
            proposers: outcome.partition.proposers().to_vec(),
            receivers: outcome.partition.receivers().to_vec(),
            matches: outcome.matches,
            unmatched,
            stats: outcome.stats,
        }
    }
}

fn sampler_for(seed: Option<u64>) -> Box<dyn SideSampler> {
    match seed {
        Some(seed) => Box::new(RandomSampler::seeded(seed)),
        None => Box::new(RandomSampler::from_entropy()),
    }
}

/// An empty body means "no options"; anything else must be a valid request
fn parse_dataset_request(body: &[u8]) -> Result<RunDatasetRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunDatasetRequest::default());
    }
    serde_json::from_slice(body)
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "Invalid population".to_string(),
        message: err.to_string(),
        status_code: 422,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run a matching over an inline population
///
/// POST /api/v1/pairings/run
///
/// Request body:
/// ```json
/// {
///   "scores": [[0.0, 0.8], [0.6, 0.0]],
///   "identities": ["Male", "Female"],
///   "preferences": ["Women", "Men"],
///   "seed": 42
/// }
/// ```
async fn run_pairing(
    state: web::Data<AppState>,
    req: web::Json<RunMatchingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for run request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let population = req.scores.len();
    if population > state.max_population {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Population too large".to_string(),
            message: format!(
                "{} participants exceeds the limit of {}",
                population, state.max_population
            ),
            status_code: 400,
        });
    }

    tracing::info!("Running matching for {} participants (seed: {:?})", population, req.seed);

    let mut sampler = sampler_for(req.seed);
    match state
        .matcher
        .run(&req.scores, &req.identities, &req.preferences, sampler.as_mut())
    {
        Ok(outcome) => {
            tracing::info!(
                "Matched {} pairs from {} participants ({} proposals)",
                outcome.matches.len(),
                population,
                outcome.stats.proposals
            );
            HttpResponse::Ok().json(RunMatchingResponse::from(outcome))
        }
        Err(e) => {
            tracing::info!("Rejected population of {}: {}", population, e);
            match_error_response(&e)
        }
    }
}

/// Run a matching over the configured dataset files
///
/// POST /api/v1/pairings/dataset
///
/// Request body (optional):
/// ```json
/// { "seed": 42 }
/// ```
async fn run_dataset(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> impl Responder {
    let req = match parse_dataset_request(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::info!("Invalid dataset request body: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_json".to_string(),
                message: format!("Invalid JSON: {}", e),
                status_code: 400,
            });
        }
    };

    let Some(settings) = state.dataset.clone() else {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "Dataset not configured".to_string(),
            message: "Set [dataset] dir in configuration to enable this endpoint".to_string(),
            status_code: 404,
        });
    };

    let seed = req.seed;
    let matcher = state.matcher.clone();
    let max_population = state.max_population;

    let result = web::block(move || {
        let dataset = Dataset::load(&settings)?;
        dataset.ensure_population_within(max_population)?;
        let mut sampler = sampler_for(seed);
        dataset.run(&matcher, sampler.as_mut())
    })
    .await;

    match result {
        Ok(Ok(outcome)) => HttpResponse::Ok().json(RunMatchingResponse::from(outcome)),
        Ok(Err(DatasetError::Match(e))) => {
            tracing::warn!("Dataset rejected by matcher: {}", e);
            match_error_response(&e)
        }
        Ok(Err(e @ DatasetError::PopulationTooLarge { .. })) => {
            tracing::warn!("Dataset rejected: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Population too large".to_string(),
                message: e.to_string(),
                status_code: 400,
            })
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to load dataset: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to load dataset".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
        Err(e) => {
            tracing::error!("Dataset worker failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal error".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
