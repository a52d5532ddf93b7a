use crate::pipeline::batch_manifest::BatchJob;
use crate::pipeline::job_result::JobResult;
use crate::shared::error::ChromaKeyError;

/// Runs independent jobs on a fixed pool of worker threads.
///
/// Workers pull jobs from a shared queue, so a slow job never blocks the
/// others. Results come back in manifest order; a failed job is reported as
/// its error message and does not affect the rest.
pub struct ThreadedBatchRunner {
    workers: usize,
}

impl ThreadedBatchRunner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn run<F>(&self, jobs: &[BatchJob], run_job: F) -> Vec<Result<JobResult, String>>
    where
        F: Fn(usize, &BatchJob) -> Result<JobResult, ChromaKeyError> + Sync,
    {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &BatchJob)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        for entry in jobs.iter().enumerate() {
            if job_tx.send(entry).is_err() {
                break;
            }
        }
        drop(job_tx);

        let worker_count = self.workers.min(jobs.len());
        log::info!("Running {} jobs on {worker_count} workers", jobs.len());

        std::thread::scope(|scope| {
            for worker in 0..worker_count {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let run_job = &run_job;
                scope.spawn(move || {
                    for (position, job) in job_rx.iter() {
                        log::info!("[worker {worker}] job {position}: {}", job.input);
                        let result = run_job(position, job).map_err(|e| e.to_string());
                        if let Err(e) = &result {
                            log::warn!("[worker {worker}] job {position} failed: {e}");
                        }
                        if result_tx.send((position, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<Option<Result<JobResult, String>>> = vec![None; jobs.len()];
        for (position, result) in result_rx.iter() {
            results[position] = Some(result);
        }
        results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Err("job was never run".to_string())))
            .collect()
    }
}
