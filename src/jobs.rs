use super::*;

/// The job table: the current job plus every job shares may still be
/// submitted against. Always accessed under the job manager's lock.
#[derive(Debug, Default)]
pub(crate) struct Jobs {
    counter: JobCounter,
    latest: Option<Arc<Job>>,
    valid: HashMap<JobId, Arc<Job>>,
}

impl Jobs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn next_id(&mut self) -> JobId {
        self.counter.next()
    }

    /// Builds a job under the next id. The id is only consumed if `build`
    /// succeeds.
    pub(crate) fn build_next(
        &mut self,
        build: impl FnOnce(JobId) -> Result<Job>,
    ) -> Result<Arc<Job>> {
        let mut counter = self.counter.clone();
        let job = build(counter.next())?;
        self.counter = counter;
        Ok(Arc::new(job))
    }

    pub(crate) fn get(&self, id: &JobId) -> Option<Arc<Job>> {
        self.valid.get(id).cloned()
    }

    pub(crate) fn latest(&self) -> Option<&Arc<Job>> {
        self.latest.as_ref()
    }

    pub(crate) fn len(&self) -> usize {
        self.valid.len()
    }

    /// Makes `job` current and keeps the jobs before it valid.
    pub(crate) fn insert(&mut self, job: Arc<Job>) {
        self.latest = Some(job.clone());
        self.valid.insert(job.job_id, job);
    }

    /// Makes `job` current and forgets every other job.
    pub(crate) fn insert_and_clean(&mut self, job: Arc<Job>) {
        self.latest = Some(job.clone());
        self.valid.clear();
        self.valid.insert(job.job_id, job);
    }
}
