//! `mcfleet schedule` — Run backup and render unattended, forever.
//!
//! Jobs live in an in-process queue keyed by their next slot. Nothing is
//! persisted: runs missed while the process was down are not caught up, and
//! a late poll runs a job once, then schedules it from the current time.

use anyhow::Result;
use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;

use crate::dispatch::Fleet;
use crate::error::FleetError;
use crate::{backup, render};

type JobFn<'a> = Box<dyn FnMut() -> Result<()> + 'a>;

struct Job<'a> {
    name: String,
    every_days: u32,
    at: NaiveTime,
    next_run: DateTime<Tz>,
    run: JobFn<'a>,
}

pub struct Scheduler<'a> {
    tz: Tz,
    jobs: Vec<Job<'a>>,
}

pub fn parse_time(s: &str) -> Result<NaiveTime, FleetError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| FleetError::InvalidTime(s.to_string()))
}

/// Next slot for a job that runs every `days` days at `at`, seen from `now`.
///
/// The slot is `days` days out, except that a daily job whose time has not
/// yet come today runs today.
fn next_slot(tz: Tz, now: DateTime<Tz>, days: u32, at: NaiveTime) -> DateTime<Tz> {
    let today = now.date_naive();
    let date = if days == 1 && at > now.time() {
        today
    } else {
        today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(today)
    };
    let local = date.and_time(at);
    // A slot inside a DST gap moves one hour later.
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

impl<'a> Scheduler<'a> {
    pub fn new(tz: Tz) -> Self {
        Scheduler {
            tz,
            jobs: Vec::new(),
        }
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn every_days(
        &mut self,
        now: DateTime<Tz>,
        days: u32,
        at: NaiveTime,
        name: &str,
        job: impl FnMut() -> Result<()> + 'a,
    ) {
        let days = days.max(1);
        let next_run = next_slot(self.tz, now, days, at);
        tracing::info!(job = name, next_run = %next_run, "scheduled");
        self.jobs.push(Job {
            name: name.to_string(),
            every_days: days,
            at,
            next_run,
            run: Box::new(job),
        });
    }

    /// Earliest upcoming slot across all jobs.
    pub fn next_run(&self) -> Option<DateTime<Tz>> {
        self.jobs.iter().map(|j| j.next_run).min()
    }

    /// Run every job due at `now`. A failing job is logged and rescheduled
    /// like a successful one. Returns how many jobs ran.
    pub fn run_pending(&mut self, now: DateTime<Tz>) -> usize {
        let mut ran = 0;
        for job in self.jobs.iter_mut().filter(|j| j.next_run <= now) {
            tracing::info!(job = %job.name, "running scheduled job");
            if let Err(e) = (job.run)() {
                eprintln!(":: Scheduled {} failed: {:#}", job.name, e);
                tracing::error!(job = %job.name, error = %format!("{:#}", e), "scheduled job failed");
            }
            job.next_run = next_slot(self.tz, now, job.every_days, job.at);
            tracing::info!(job = %job.name, next_run = %job.next_run, "rescheduled");
            ran += 1;
        }
        ran
    }

    /// Poll for due jobs every `poll`, forever.
    pub fn run_forever(&mut self, poll: Duration) -> ! {
        loop {
            let now = self.now();
            self.run_pending(now);
            std::thread::sleep(poll);
        }
    }
}

/// Bind the configured backup and render jobs to `fleet`.
pub fn register<'a>(
    scheduler: &mut Scheduler<'a>,
    fleet: &'a Fleet<'a>,
    now: DateTime<Tz>,
) -> Result<()> {
    let cfg = &fleet.config.schedule;

    let backup_names = vec![cfg.backup.group.clone()];
    scheduler.every_days(
        now,
        cfg.backup.every_days,
        parse_time(&cfg.backup.at)?,
        "backup",
        move || {
            let report = backup::run(fleet, &backup_names);
            if let Some((target, _)) = report.failed.first() {
                anyhow::bail!(
                    "{} backup(s) failed, first: {}",
                    report.failed.len(),
                    target
                );
            }
            Ok(())
        },
    );

    let render_names = vec![cfg.render.group.clone()];
    scheduler.every_days(
        now,
        cfg.render.every_days,
        parse_time(&cfg.render.at)?,
        "render",
        move || render::run(fleet, &render_names).map(|_| ()),
    );
    Ok(())
}
