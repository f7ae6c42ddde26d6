use actix_web::{web, HttpResponse, Responder};
use tracing::{debug, error, info, instrument};

use crate::api::models::{AppState, ErrorResponse, HealthStatus, TldLookupResponse};
use crate::pipeline::{current_dataset, load_unified, Snapshot};
use crate::supplemental::{group_managers, SupplementalData};

fn internal_error(context: &str, e: anyhow::Error) -> HttpResponse {
    error!("{}: {:#}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse::new(format!("{}: {:#}", context, e)))
}

/// Health check endpoint
///
/// Reports uptime and whether a unified dataset has been built yet.
#[instrument(skip(state))]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let generated = match load_unified(&state.store).await {
        Ok(dataset) => dataset.map(|d| d.generated),
        Err(e) => {
            debug!("Health check could not read dataset: {:#}", e);
            None
        }
    };

    let status = if generated.is_some() { "healthy" } else { "degraded" };
    info!("Health check: status={}", status);

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
        dataset_generated: generated,
    })
}

/// Count summaries for the TLD list, bootstrap file and root zone database
#[instrument(skip(state))]
pub async fn analysis_handler(state: web::Data<AppState>) -> impl Responder {
    match Snapshot::load(&state.store).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot.analysis()),
        Err(e) => internal_error("Failed to load sources", e),
    }
}

/// Bootstrap labels against delegated registry entries
#[instrument(skip(state))]
pub async fn compare_bootstrap_handler(state: web::Data<AppState>) -> impl Responder {
    match Snapshot::load(&state.store).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot.compare_bootstrap()),
        Err(e) => internal_error("Failed to load sources", e),
    }
}

/// TLD list against delegated registry entries
#[instrument(skip(state))]
pub async fn compare_tld_list_handler(state: web::Data<AppState>) -> impl Responder {
    match Snapshot::load(&state.store).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot.compare_tld_list()),
        Err(e) => internal_error("Failed to load sources", e),
    }
}

/// The unified dataset
#[instrument(skip(state))]
pub async fn tlds_handler(state: web::Data<AppState>) -> impl Responder {
    match current_dataset(&state.store, &state.supplemental_path).await {
        Ok(dataset) => HttpResponse::Ok().json(dataset),
        Err(e) => internal_error("Failed to load unified dataset", e),
    }
}

/// A single TLD with its RDAP servers, by ASCII or Unicode label
#[instrument(skip(state))]
pub async fn tld_handler(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let label = path.into_inner();
    let dataset = match current_dataset(&state.store, &state.supplemental_path).await {
        Ok(dataset) => dataset,
        Err(e) => return internal_error("Failed to load unified dataset", e),
    };

    match dataset.find(&label) {
        Some((entry, group)) => HttpResponse::Ok().json(TldLookupResponse {
            entry: entry.clone(),
            rdap_servers: group.rdap_servers.clone(),
        }),
        None => {
            debug!("Unknown TLD requested: {}", label);
            HttpResponse::NotFound().json(ErrorResponse::new(format!("Unknown TLD: {}", label)))
        }
    }
}

/// TLD counts per manager with aliases folded together
#[instrument(skip(state))]
pub async fn managers_handler(state: web::Data<AppState>) -> impl Responder {
    let dataset = match current_dataset(&state.store, &state.supplemental_path).await {
        Ok(dataset) => dataset,
        Err(e) => return internal_error("Failed to load unified dataset", e),
    };
    let supplemental = match SupplementalData::load(&state.supplemental_path).await {
        Ok(supplemental) => supplemental,
        Err(e) => return internal_error("Failed to load supplemental data", e),
    };

    HttpResponse::Ok().json(group_managers(&dataset, &supplemental.manager_aliases))
}
