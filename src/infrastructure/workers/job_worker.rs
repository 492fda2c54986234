use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::application::services::{AuthService, NotificationService, SlaMonitor};
use crate::domain::entities::{job_types, Job};
use crate::domain::ports::task_queue::TaskQueue;
use crate::domain::ports::time_service::{Clock, TimeService};
use crate::infrastructure::http::middleware::error::ApiResult;

const MAX_JOB_ATTEMPTS: i32 = 3;

/// How often each recurring job re-enqueues itself.
#[derive(Debug, Clone, Copy)]
pub struct JobSchedule {
    pub cleanup_sessions: chrono::Duration,
    pub cleanup_rate_limiter: chrono::Duration,
    pub cleanup_notifications: chrono::Duration,
    pub check_sla_escalations: chrono::Duration,
}

impl JobSchedule {
    pub fn with_sla_interval_minutes(minutes: i64) -> Self {
        Self {
            check_sla_escalations: chrono::Duration::minutes(minutes.max(1)),
            ..Self::default()
        }
    }

    fn interval(&self, job_type: &str) -> Option<chrono::Duration> {
        match job_type {
            job_types::CLEANUP_SESSIONS => Some(self.cleanup_sessions),
            job_types::CLEANUP_RATE_LIMITER => Some(self.cleanup_rate_limiter),
            job_types::CLEANUP_NOTIFICATIONS => Some(self.cleanup_notifications),
            job_types::CHECK_SLA_ESCALATIONS => Some(self.check_sla_escalations),
            _ => None,
        }
    }
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self {
            cleanup_sessions: chrono::Duration::hours(1),
            cleanup_rate_limiter: chrono::Duration::minutes(15),
            cleanup_notifications: chrono::Duration::hours(24),
            check_sla_escalations: chrono::Duration::minutes(15),
        }
    }
}

pub const RECURRING_JOBS: [&str; 4] = [
    job_types::CLEANUP_SESSIONS,
    job_types::CLEANUP_RATE_LIMITER,
    job_types::CLEANUP_NOTIFICATIONS,
    job_types::CHECK_SLA_ESCALATIONS,
];

#[derive(Clone)]
pub struct JobProcessor {
    queue: Arc<dyn TaskQueue>,
    auth_service: AuthService,
    notification_service: NotificationService,
    sla_monitor: SlaMonitor,
    schedule: JobSchedule,
    clock: Arc<dyn Clock>,
    time_service: Arc<dyn TimeService>,
}

impl JobProcessor {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        auth_service: AuthService,
        notification_service: NotificationService,
        sla_monitor: SlaMonitor,
        schedule: JobSchedule,
        clock: Arc<dyn Clock>,
        time_service: Arc<dyn TimeService>,
    ) -> Self {
        Self {
            queue,
            auth_service,
            notification_service,
            sla_monitor,
            schedule,
            clock,
            time_service,
        }
    }

    /// Enqueues every recurring job that is not already pending or running,
    /// so restarts never stack duplicate schedules.
    pub async fn schedule_recurring_jobs(&self) -> ApiResult<usize> {
        let mut scheduled = 0;
        for job_type in RECURRING_JOBS {
            if self.queue.has_active_job(job_type).await? {
                continue;
            }
            self.queue
                .enqueue(job_type, Value::Null, MAX_JOB_ATTEMPTS)
                .await?;
            scheduled += 1;
        }

        info!("Scheduled {} recurring jobs", scheduled);
        Ok(scheduled)
    }

    pub async fn run(&self) {
        info!("Starting JobProcessor...");
        loop {
            match self.process_next().await {
                Ok(Some(_)) => continue,
                Ok(None) => {
                    self.time_service.sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    error!("Error processing job: {}", e);
                    self.time_service.sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Runs at most one due job. Returns its type when one ran.
    pub async fn process_next(&self) -> Result<Option<String>, String> {
        let Some(job) = self
            .queue
            .fetch_next_job()
            .await
            .map_err(|e| e.to_string())?
        else {
            return Ok(None);
        };

        debug!("Processing job {} (type: {})", job.id, job.job_type);

        match self.execute_job(&job).await {
            Ok(()) => {
                if let Err(e) = self.queue.complete_job(&job.id).await {
                    error!("Failed to mark job {} as completed: {}", job.id, e);
                }
            }
            Err(e) => {
                error!("Job {} ({}) failed: {}", job.id, job.job_type, e);
                if let Err(retry_err) = self.queue.fail_job(&job.id, &e).await {
                    error!("Failed to mark job {} as failed: {}", job.id, retry_err);
                }
            }
        }

        Ok(Some(job.job_type))
    }

    async fn execute_job(&self, job: &Job) -> Result<(), String> {
        let outcome = match job.job_type.as_str() {
            job_types::CLEANUP_SESSIONS => self.handle_cleanup_sessions().await,
            job_types::CLEANUP_RATE_LIMITER => self.handle_cleanup_rate_limiter().await,
            job_types::CLEANUP_NOTIFICATIONS => self.handle_cleanup_notifications().await,
            job_types::CHECK_SLA_ESCALATIONS => self.handle_check_sla_escalations().await,
            _ => return Err(format!("Unknown job type: {}", job.job_type)),
        };

        // Recurring jobs keep their cadence even when a run fails
        if let Err(e) = &outcome {
            error!("{} run failed: {}", job.job_type, e);
        }
        self.reschedule(&job.job_type).await
    }

    async fn reschedule(&self, job_type: &str) -> Result<(), String> {
        let Some(interval) = self.schedule.interval(job_type) else {
            return Ok(());
        };

        self.queue
            .enqueue_at(
                job_type,
                Value::Null,
                self.clock.now() + interval,
                MAX_JOB_ATTEMPTS,
            )
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    // --- Job Handlers ---

    async fn handle_cleanup_sessions(&self) -> Result<(), String> {
        let count = self
            .auth_service
            .cleanup_expired_sessions()
            .await
            .map_err(|e| format!("Failed to cleanup sessions: {}", e))?;
        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }
        Ok(())
    }

    async fn handle_cleanup_rate_limiter(&self) -> Result<(), String> {
        let removed = self.auth_service.rate_limiter().cleanup().await;
        if removed > 0 {
            debug!("Dropped {} idle rate limiter entries", removed);
        }
        Ok(())
    }

    async fn handle_cleanup_notifications(&self) -> Result<(), String> {
        self.notification_service
            .cleanup_old_notifications()
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to cleanup notifications: {}", e))
    }

    async fn handle_check_sla_escalations(&self) -> Result<(), String> {
        self.sla_monitor
            .check_sla_escalations()
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to check SLA escalations: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_covers_every_recurring_job() {
        let schedule = JobSchedule::with_sla_interval_minutes(5);
        for job_type in RECURRING_JOBS {
            assert!(schedule.interval(job_type).is_some(), "{}", job_type);
        }
        assert_eq!(
            schedule.interval(job_types::CHECK_SLA_ESCALATIONS),
            Some(chrono::Duration::minutes(5))
        );
        assert_eq!(schedule.interval("print_invoice"), None);
    }
}
