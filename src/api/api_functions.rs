use std::sync::Arc;

use actix_web::web;
use tokio::sync::Mutex;

use crate::api::api_handlers::{
    handle_compute, handle_compute_big, handle_execute_tasks, handle_get_result, handle_metrics, handle_submit_task,
};
use crate::api::api_objects::SubmittedJobs;
use crate::config::Config;
use crate::evaluation_metrics::EvaluationMetrics;
use crate::scheduler::SchedulerEngine;

/// Shared state behind the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<Config>,
    pub submitted_jobs: web::Data<SubmittedJobs>,
    pub scheduler: web::Data<Arc<Mutex<SchedulerEngine>>>,
    pub metrics: web::Data<Arc<EvaluationMetrics>>,
}

impl AppState {
    pub fn new(config: Config, core_ids: Vec<core_affinity::CoreId>) -> Self {
        let submitted_jobs = web::Data::new(SubmittedJobs::new());
        let metrics = Arc::new(EvaluationMetrics::new());
        let scheduler = SchedulerEngine::new(core_ids, submitted_jobs.clone(), &config, metrics.clone());
        AppState {
            config: web::Data::new(config),
            submitted_jobs,
            scheduler: web::Data::new(Arc::new(Mutex::new(scheduler))),
            metrics: web::Data::new(metrics),
        }
    }

    /// Registers shared data and routes, used by both the server and the tests.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.submitted_jobs.clone())
            .app_data(self.scheduler.clone())
            .app_data(self.metrics.clone())
            .route("/submit_task", web::post().to(handle_submit_task))
            .route("/execute_tasks", web::post().to(handle_execute_tasks))
            .route("/get_result", web::get().to(handle_get_result))
            .route("/compute", web::get().to(handle_compute))
            .route("/compute_big", web::get().to(handle_compute_big))
            .route("/metrics", web::get().to(handle_metrics));
    }
}
