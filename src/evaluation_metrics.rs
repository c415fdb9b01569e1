use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::api_objects::{JobResult, JobStatus};
use crate::fibonacci::Strategy;
use crate::memory_monitoring::peak_memory_kb;

pub const METRICS_FILE: &str = "evaluation_metrics.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub complexity: String,
    pub samples: usize,
    pub mean_nanos: f64,
    pub min_nanos: u128,
    pub max_nanos: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub total_jobs: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_time_ms: f64,
    pub average_response_time_ms: f64,
    pub throughput: f64, // jobs/second
    pub peak_memory_kb: u64,
    pub strategies: Vec<StrategySummary>,
}

/// Evaluation metrics storage, shared between the scheduler and its workers
pub struct EvaluationMetrics {
    execution_start_time: Arc<StdMutex<Option<Instant>>>,
    response_time_per_task: Arc<StdMutex<HashMap<String, Duration>>>,
    samples_per_strategy: Arc<StdMutex<BTreeMap<Strategy, Vec<u128>>>>,
    task_status: Arc<Mutex<HashMap<String, JobStatus>>>,
    completed_count: Arc<Mutex<usize>>,
    last_summary: Arc<Mutex<Option<BatchSummary>>>,
}

impl Default for EvaluationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        EvaluationMetrics {
            execution_start_time: Arc::new(StdMutex::new(None)),
            response_time_per_task: Arc::new(StdMutex::new(HashMap::new())),
            samples_per_strategy: Arc::new(StdMutex::new(BTreeMap::new())),
            task_status: Arc::new(Mutex::new(HashMap::new())),
            completed_count: Arc::new(Mutex::new(0)),
            last_summary: Arc::new(Mutex::new(None)),
        }
    }

    /// Resets per-batch state and marks every id as waiting.
    pub async fn initialize(&self, task_ids: Vec<String>) {
        let start_time = Instant::now();
        *self.lock_start_time() = Some(start_time);
        self.lock_response_times().clear();
        self.lock_samples().clear();

        let mut task_status = self.task_status.lock().await;
        task_status.clear();
        for task_id in task_ids {
            task_status.insert(task_id, JobStatus::Waiting);
        }
        *self.completed_count.lock().await = 0;
        info!("Evaluation metrics: start executing {} jobs", task_status.len());
    }

    pub async fn set_task_status(&self, task_id: &str, status: JobStatus) {
        let mut task_status = self.task_status.lock().await;
        let previous = task_status
            .insert(task_id.to_string(), status)
            .unwrap_or(JobStatus::Waiting);
        // Both successful and failed jobs count as completed, only once
        let was_done = matches!(previous, JobStatus::Succeeded | JobStatus::Failed);
        let is_done = matches!(status, JobStatus::Succeeded | JobStatus::Failed);
        if !was_done && is_done {
            *self.completed_count.lock().await += 1;
        }
    }

    pub fn set_response_time(&self, task_id: &str, response_time: Duration) {
        self.lock_response_times().insert(task_id.to_string(), response_time);
    }

    pub fn record_result(&self, result: &JobResult) {
        self.lock_samples()
            .entry(result.strategy)
            .or_default()
            .push(result.elapsed_nanos);
    }

    pub async fn get_completed_count(&self) -> usize {
        *self.completed_count.lock().await
    }

    pub async fn get_total_tasks(&self) -> usize {
        self.task_status.lock().await.len()
    }

    pub async fn are_all_tasks_completed(&self) -> bool {
        let total_tasks = self.get_total_tasks().await;
        total_tasks > 0 && self.get_completed_count().await == total_tasks
    }

    pub fn get_execution_start_time(&self) -> Option<Instant> {
        *self.lock_start_time()
    }

    pub fn calculate_average_response_time_ms(&self) -> f64 {
        let response_times = self.lock_response_times();
        if response_times.is_empty() {
            return 0.0;
        }
        response_times.values().sum::<Duration>().as_secs_f64() * 1000.0 / response_times.len() as f64
    }

    pub fn strategy_summaries(&self) -> Vec<StrategySummary> {
        self.lock_samples()
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(strategy, samples)| StrategySummary {
                strategy: *strategy,
                complexity: strategy.complexity().to_string(),
                samples: samples.len(),
                mean_nanos: samples.iter().sum::<u128>() as f64 / samples.len() as f64,
                min_nanos: samples.iter().copied().min().unwrap_or(0),
                max_nanos: samples.iter().copied().max().unwrap_or(0),
            })
            .collect()
    }

    pub async fn summary(&self, completion_time: Instant) -> BatchSummary {
        let total_jobs = self.get_total_tasks().await;
        let (succeeded, failed) = {
            let task_status = self.task_status.lock().await;
            let succeeded = task_status.values().filter(|s| **s == JobStatus::Succeeded).count();
            let failed = task_status.values().filter(|s| **s == JobStatus::Failed).count();
            (succeeded, failed)
        };
        let total_time = self
            .get_execution_start_time()
            .map(|start| completion_time.duration_since(start))
            .unwrap_or_default();
        let throughput = if total_time.is_zero() {
            0.0
        } else {
            total_jobs as f64 / total_time.as_secs_f64()
        };
        BatchSummary {
            total_jobs,
            succeeded,
            failed,
            total_time_ms: total_time.as_secs_f64() * 1000.0,
            average_response_time_ms: self.calculate_average_response_time_ms(),
            throughput,
            peak_memory_kb: peak_memory_kb(),
            strategies: self.strategy_summaries(),
        }
    }

    /// Builds the batch summary, logs it, writes it under `results_dir` and keeps it for `/metrics`.
    pub async fn all_tasks_completed_callback(&self, results_dir: &Path) -> BatchSummary {
        let summary = self.summary(Instant::now()).await;

        info!("=== Execution completed ===");
        info!("Total jobs processed: {}", summary.total_jobs);
        info!("Total execution time: {:.2} ms", summary.total_time_ms);
        info!("Average response time per job: {:.2} ms", summary.average_response_time_ms);
        info!("Throughput: {:.2} jobs/second", summary.throughput);
        info!("Jobs succeeded: {}, failed: {}", summary.succeeded, summary.failed);
        for strategy in &summary.strategies {
            info!(
                "{:<16} {:>9} samples={} mean={:.0}ns min={}ns max={}ns",
                strategy.strategy.name(),
                strategy.complexity,
                strategy.samples,
                strategy.mean_nanos,
                strategy.min_nanos,
                strategy.max_nanos
            );
        }

        if let Err(e) = store_evaluation_metrics(&summary, results_dir) {
            warn!("Failed to write evaluation metrics: {e}");
        }
        *self.last_summary.lock().await = Some(summary.clone());
        summary
    }

    pub async fn last_summary(&self) -> Option<BatchSummary> {
        self.last_summary.lock().await.clone()
    }

    fn lock_start_time(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.execution_start_time.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_response_times(&self) -> std::sync::MutexGuard<'_, HashMap<String, Duration>> {
        self.response_time_per_task.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_samples(&self) -> std::sync::MutexGuard<'_, BTreeMap<Strategy, Vec<u128>>> {
        self.samples_per_strategy.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn store_evaluation_metrics(summary: &BatchSummary, results_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(results_dir)?;
    let path = results_dir.join(METRICS_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    info!("Evaluation metrics written to {}", path.display());
    Ok(())
}
