use std::collections::VecDeque;
use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use core_affinity::CoreId;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task;

use crate::api::api_objects::{Job, JobResult, JobStatus, SubmittedJobs};
use crate::evaluation_metrics::EvaluationMetrics;
use crate::fibonacci::FibError;

// Worker is mapped to a core id and runs the jobs located in its queue
pub struct Worker {
    pub worker_id: usize,
    pub core_id: CoreId,
    pin_core: bool,
    thread_queue: Arc<Mutex<VecDeque<Job>>>,
}

impl Worker {
    pub fn new(worker_id: usize, core_id: CoreId, pin_core: bool) -> Self {
        let thread_queue = Arc::new(Mutex::new(VecDeque::new()));
        Worker {
            worker_id,
            core_id,
            pin_core,
            thread_queue,
        }
    }

    pub async fn add_to_queue(&self, jobs: Vec<Job>) {
        self.thread_queue.lock().await.extend(jobs);
    }

    pub async fn queue_len(&self) -> usize {
        self.thread_queue.lock().await.len()
    }

    pub fn result_path(results_dir: &Path, job_id: &str) -> PathBuf {
        results_dir.join(format!("result_{job_id}.json"))
    }

    pub fn store_result(results_dir: &Path, result: &JobResult) -> anyhow::Result<()> {
        std::fs::create_dir_all(results_dir)?;
        let path = Self::result_path(results_dir, &result.id);
        std::fs::write(path, serde_json::to_string(result)?)?;
        Ok(())
    }

    /// Runs the job's strategy `repetitions` times and reports the mean time of one call.
    pub fn time_job(job: &Job, worker_id: usize) -> Result<JobResult, FibError> {
        if job.repetitions == 0 {
            return Err(FibError::InvalidRepetitions);
        }
        let mut value = 0;
        let start = Instant::now();
        for _ in 0..job.repetitions {
            value = black_box(job.strategy.compute(black_box(job.n))?);
        }
        let elapsed = start.elapsed();
        Ok(JobResult {
            id: job.id.clone(),
            strategy: job.strategy,
            n: job.n,
            value,
            repetitions: job.repetitions,
            elapsed_nanos: elapsed.as_nanos() / u128::from(job.repetitions),
            worker_id,
        })
    }

    pub fn run_job(
        core_id: CoreId,
        pin_core: bool,
        worker_id: usize,
        job: Job,
    ) -> task::JoinHandle<Result<JobResult, FibError>> {
        task::spawn_blocking(move || {
            if pin_core && !core_affinity::set_for_current(core_id) {
                warn!("Failed to pin job {} to core {}", job.id, core_id.id);
            }
            debug!("Running job {} ({} n={}) on core {:?}", job.id, job.strategy, job.n, core_id);
            Self::time_job(&job, worker_id)
        })
    }

    /// Runs queued jobs one at a time until the queue is empty.
    pub async fn drain(&self, metrics: &EvaluationMetrics, submitted_jobs: &SubmittedJobs, results_dir: &Path) {
        info!("Worker {} started on core id {:?}", self.worker_id, self.core_id);
        loop {
            // Release the queue lock before running the job
            let next_job = self.thread_queue.lock().await.pop_front();
            let Some(job) = next_job else {
                break;
            };

            metrics.set_task_status(&job.id, JobStatus::Running).await;
            let job_id = job.id.clone();
            let arrival_time = job.arrival_time;
            let handle = Self::run_job(self.core_id, self.pin_core, self.worker_id, job);

            let status = match handle.await {
                Ok(Ok(result)) => {
                    metrics.record_result(&result);
                    if let Err(e) = Self::store_result(results_dir, &result) {
                        warn!("Worker {}: failed to store result of job {}: {e}", self.worker_id, job_id);
                    }
                    info!(
                        "Worker {}: job {} {}({}) = {} in {}ns",
                        self.worker_id, job_id, result.strategy, result.n, result.value, result.elapsed_nanos
                    );
                    JobStatus::Succeeded
                }
                Ok(Err(e)) => {
                    warn!("Worker {}: job {} failed: {e}", self.worker_id, job_id);
                    JobStatus::Failed
                }
                Err(e) => {
                    error!("Worker {}: job {} panicked or was cancelled: {e}", self.worker_id, job_id);
                    JobStatus::Failed
                }
            };

            if status == JobStatus::Succeeded {
                submitted_jobs.add_to_successful(&job_id).await;
            } else {
                submitted_jobs.add_to_failed(&job_id).await;
            }
            metrics.set_response_time(&job_id, arrival_time.elapsed().unwrap_or_default());
            metrics.set_task_status(&job_id, status).await;
        }
        debug!("Worker {} queue empty", self.worker_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci::Strategy;
    use test_log::test;

    fn job(id: &str, strategy: Strategy, n: u64, repetitions: u32) -> Job {
        Job {
            id: id.to_string(),
            strategy,
            n,
            repetitions,
            arrival_time: std::time::SystemTime::now(),
        }
    }

    fn temp_results_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fib-bench-worker-{}-{name}", std::process::id()))
    }

    #[test]
    fn time_job_reports_value_and_mean() {
        let result = Worker::time_job(&job("a", Strategy::LinearMatrix, 20, 3), 4).unwrap();
        assert_eq!(result.value, 6765);
        assert_eq!(result.repetitions, 3);
        assert_eq!(result.worker_id, 4);
    }

    #[test]
    fn time_job_propagates_overflow() {
        assert_eq!(
            Worker::time_job(&job("a", Strategy::Iterative, 100, 1), 0).unwrap_err(),
            FibError::Overflow { n: 100, max: 93 }
        );
    }

    #[test(tokio::test)]
    async fn drain_runs_every_job_and_stores_results() {
        let results_dir = temp_results_dir("drain");
        let worker = Worker::new(0, CoreId { id: 0 }, false);
        let metrics = EvaluationMetrics::new();
        let submitted = SubmittedJobs::new();
        let jobs = vec![
            job("ok", Strategy::FastMatrix, 30, 2),
            job("overflow", Strategy::TailRecursive, 94, 1),
        ];
        metrics.initialize(jobs.iter().map(|j| j.id.clone()).collect()).await;
        worker.add_to_queue(jobs).await;

        worker.drain(&metrics, &submitted, &results_dir).await;

        assert_eq!(worker.queue_len().await, 0);
        assert!(metrics.are_all_tasks_completed().await);
        assert_eq!(submitted.get_successful_count().await, 1);
        assert_eq!(submitted.get_failed_count().await, 1);

        let stored = std::fs::read_to_string(Worker::result_path(&results_dir, "ok")).unwrap();
        let stored: JobResult = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.value, 832040);
        std::fs::remove_dir_all(results_dir).unwrap();
    }
}
