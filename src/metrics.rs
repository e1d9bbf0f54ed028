/// A point-in-time snapshot of pool activity.
///
/// Counters are sampled independently, so a snapshot taken while tasks
/// are in flight may not be mutually consistent.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub workers: usize,
    pub queued_tasks: usize,
    pub running_tasks: usize,
    pub completed_tasks: usize,
    pub panicked_tasks: usize,
}

impl PoolMetrics {
    pub fn finished(&self) -> usize {
        self.completed_tasks + self.panicked_tasks
    }

    pub fn success_rate(&self) -> f64 {
        let finished = self.finished();
        if finished == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / finished as f64
    }
}
