use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use core_affinity::CoreId;
use futures::future::join_all;
use log::info;
use rand::seq::SliceRandom;

use crate::api::api_objects::{Job, SubmittedJobs};
use crate::config::Config;
use crate::evaluation_metrics::{BatchSummary, EvaluationMetrics};
use crate::worker::Worker;

// ========== SCHEDULER ==========
pub struct SchedulerEngine {
    submitted_jobs: web::Data<SubmittedJobs>,
    workers: Vec<Arc<Worker>>,
    evaluation_metrics: Arc<EvaluationMetrics>,
    results_dir: PathBuf,
    shuffle_jobs: bool,
}

impl SchedulerEngine {
    pub fn new(
        core_ids: Vec<CoreId>,
        submitted_jobs: web::Data<SubmittedJobs>,
        config: &Config,
        evaluation_metrics: Arc<EvaluationMetrics>,
    ) -> Self {
        // Without core ids (unsupported platform) workers still run, they just never pin
        let core_ids = if core_ids.is_empty() {
            vec![CoreId { id: 0 }]
        } else {
            core_ids
        };
        let pin_cores = config.pin_cores;
        let workers: Vec<Arc<Worker>> = (0..config.num_workers.max(1))
            .map(|i| Arc::new(Worker::new(i, core_ids[i % core_ids.len()], pin_cores)))
            .collect();

        SchedulerEngine {
            submitted_jobs,
            workers,
            evaluation_metrics,
            results_dir: PathBuf::from(&config.results_dir),
            shuffle_jobs: config.shuffle_jobs,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Deals jobs to worker queues round-robin.
    pub async fn distribute(&self, jobs: Vec<Job>) {
        let mut per_worker: Vec<Vec<Job>> = vec![Vec::new(); self.workers.len()];
        for (i, job) in jobs.into_iter().enumerate() {
            per_worker[i % self.workers.len()].push(job);
        }
        for (worker, jobs) in self.workers.iter().zip(per_worker) {
            worker.add_to_queue(jobs).await;
        }
    }

    /// Runs every submitted job to completion and returns the batch summary.
    pub async fn execute_jobs(&self) -> BatchSummary {
        let mut jobs = self.submitted_jobs.take_all().await;
        if self.shuffle_jobs {
            jobs.shuffle(&mut rand::rng());
        }
        info!("Scheduler: executing {} jobs on {} workers", jobs.len(), self.workers.len());

        self.evaluation_metrics
            .initialize(jobs.iter().map(|job| job.id.clone()).collect())
            .await;
        self.distribute(jobs).await;

        let metrics = &self.evaluation_metrics;
        let submitted_jobs = self.submitted_jobs.get_ref();
        let results_dir = self.results_dir.as_path();
        join_all(
            self.workers
                .iter()
                .map(|worker| worker.drain(metrics, submitted_jobs, results_dir)),
        )
        .await;

        self.evaluation_metrics
            .all_tasks_completed_callback(&self.results_dir)
            .await
    }
}
