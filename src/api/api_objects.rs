use crate::config::Config;
use crate::fibonacci::{FibError, Strategy, MAX_N};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchJobRequest {
    pub task_id: Option<String>,
    pub strategy: Strategy,
    pub n: u64,
    pub repetitions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ComputeQuery {
    pub strategy: String,
    pub n: u64,
}

#[derive(Debug, Deserialize)]
pub struct ComputeBigQuery {
    pub n: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ComputeResponse {
    pub strategy: Strategy,
    pub n: u64,
    pub value: String,
    pub elapsed_nanos: u128,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SubmitResponse {
    pub task_id: String,
    pub queued: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Waiting,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    pub id: String,
    pub strategy: Strategy,
    pub n: u64,
    pub repetitions: u32,
    pub arrival_time: std::time::SystemTime, // Track when job was submitted
}

impl Job {
    /// Validates a request against the overflow bound and the harness limits.
    /// `id` is used when the request carries no `task_id`.
    pub fn from_request(request: BenchJobRequest, id: String, config: &Config) -> Result<Job, FibError> {
        let id = request.task_id.unwrap_or(id);
        validate_job_id(&id)?;
        if request.n > MAX_N {
            return Err(FibError::Overflow { n: request.n, max: MAX_N });
        }
        config.check_naive_limit(request.strategy, request.n)?;
        let repetitions = request.repetitions.unwrap_or(config.default_repetitions);
        if repetitions == 0 {
            return Err(FibError::InvalidRepetitions);
        }
        Ok(Job {
            id,
            strategy: request.strategy,
            n: request.n,
            repetitions,
            arrival_time: std::time::SystemTime::now(),
        })
    }
}

/// Ids become result file names, so they are restricted to `[A-Za-z0-9_-]`.
pub fn validate_job_id(id: &str) -> Result<(), FibError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(FibError::InvalidJobId(id.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JobResult {
    pub id: String,
    pub strategy: Strategy,
    pub n: u64,
    pub value: u64,
    pub repetitions: u32,
    pub elapsed_nanos: u128, // Mean wall-clock time of one repetition
    pub worker_id: usize,
}

#[derive(Debug, Clone)]
pub struct SubmittedJobs {
    pub jobs: Arc<Mutex<VecDeque<Job>>>,
    pub successful_job_ids: Arc<Mutex<HashSet<String>>>,
    pub failed_job_ids: Arc<Mutex<HashSet<String>>>,
    used_job_ids: Arc<Mutex<HashSet<String>>>, // Every id ever queued, result files are keyed by id
    next_id: Arc<AtomicU64>,
}

impl Default for SubmittedJobs {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmittedJobs {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(VecDeque::new())),
            successful_job_ids: Arc::new(Mutex::new(HashSet::new())),
            failed_job_ids: Arc::new(Mutex::new(HashSet::new())),
            used_job_ids: Arc::new(Mutex::new(HashSet::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn next_job_id(&self) -> String {
        format!("job-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn add_task(&self, job: Job) {
        self.used_job_ids.lock().await.insert(job.id.clone());
        self.jobs.lock().await.push_back(job);
    }

    /// Validates and queues a request, returning the job id. Ids are never reused.
    pub async fn submit(&self, request: BenchJobRequest, config: &Config) -> Result<String, FibError> {
        let mut used = self.used_job_ids.lock().await;
        let generated = loop {
            let id = self.next_job_id();
            if !used.contains(&id) {
                break id;
            }
        };
        let job = Job::from_request(request, generated, config)?;
        if !used.insert(job.id.clone()) {
            return Err(FibError::DuplicateJobId(job.id));
        }
        let id = job.id.clone();
        self.jobs.lock().await.push_back(job);
        Ok(id)
    }

    pub async fn get_num_tasks(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Removes and returns every queued job in arrival order.
    pub async fn take_all(&self) -> Vec<Job> {
        self.jobs.lock().await.drain(..).collect()
    }

    pub async fn add_to_successful(&self, job_id: &str) {
        self.successful_job_ids.lock().await.insert(job_id.to_string());
    }

    pub async fn add_to_failed(&self, job_id: &str) {
        self.failed_job_ids.lock().await.insert(job_id.to_string());
    }

    pub async fn get_successful_count(&self) -> usize {
        self.successful_job_ids.lock().await.len()
    }

    pub async fn get_failed_count(&self) -> usize {
        self.failed_job_ids.lock().await.len()
    }
}
