use actix_web::{web, HttpResponse, Responder};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::api::api_objects::{
    validate_job_id, BenchJobRequest, ComputeBigQuery, ComputeQuery, ComputeResponse, SubmitResponse, SubmittedJobs,
    TaskQuery,
};
use crate::config::Config;
use crate::evaluation_metrics::EvaluationMetrics;
use crate::fibonacci::{self, Strategy};
use crate::scheduler::SchedulerEngine;
use crate::worker::Worker;

pub async fn handle_submit_task(
    task: web::Json<BenchJobRequest>,
    submitted_tasks: web::Data<SubmittedJobs>,
    config: web::Data<Config>,
) -> impl Responder {
    // Validates the request and queues the job. Returns immediately, jobs run on /execute_tasks
    match submitted_tasks.submit(task.into_inner(), &config).await {
        Ok(task_id) => {
            let queued = submitted_tasks.get_num_tasks().await;
            debug!("Number of jobs waiting: {queued}");
            HttpResponse::Ok().json(SubmitResponse { task_id, queued })
        }
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

pub async fn handle_execute_tasks(app_data: web::Data<Arc<Mutex<SchedulerEngine>>>) -> impl Responder {
    // One batch at a time
    let scheduler = app_data.lock().await;
    let summary = scheduler.execute_jobs().await;
    HttpResponse::Ok().json(summary)
}

pub async fn handle_get_result(query: web::Query<TaskQuery>, config: web::Data<Config>) -> impl Responder {
    info!("Running get result for job {}", query.id);
    if validate_job_id(&query.id).is_err() {
        return HttpResponse::NotFound().body("Result not found");
    }
    let path = Worker::result_path(Path::new(&config.results_dir), &query.id);
    match std::fs::read(&path) {
        Ok(data) => HttpResponse::Ok().content_type("application/json").body(data),
        Err(_) => HttpResponse::NotFound().body("Result not found"),
    }
}

pub async fn handle_compute(query: web::Query<ComputeQuery>, config: web::Data<Config>) -> impl Responder {
    let strategy = match query.strategy.parse::<Strategy>() {
        Ok(strategy) => strategy,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    let n = query.n;
    if let Err(e) = config.check_naive_limit(strategy, n) {
        return HttpResponse::BadRequest().body(e.to_string());
    }
    let start = Instant::now();
    // Off the async executor, naive recursion can take seconds
    let computed = web::block(move || strategy.compute(n)).await;
    let elapsed_nanos = start.elapsed().as_nanos();
    match computed {
        Ok(Ok(value)) => HttpResponse::Ok().json(ComputeResponse {
            strategy,
            n,
            value: value.to_string(),
            elapsed_nanos,
        }),
        Ok(Err(e)) => HttpResponse::BadRequest().body(e.to_string()),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn handle_compute_big(query: web::Query<ComputeBigQuery>, config: web::Data<Config>) -> impl Responder {
    let n = query.n;
    if let Err(e) = config.check_big_limit(n) {
        return HttpResponse::BadRequest().body(e.to_string());
    }
    match web::block(move || fibonacci::big::fast_matrix(n)).await {
        Ok(value) => HttpResponse::Ok().content_type("text/plain").body(value.to_string()),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn handle_metrics(metrics: web::Data<Arc<EvaluationMetrics>>) -> impl Responder {
    match metrics.last_summary().await {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => HttpResponse::NotFound().body("No batch has been executed"),
    }
}
