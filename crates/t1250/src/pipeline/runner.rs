use std::path::Path;
use std::sync::Arc;

use tracing::{debug, debug_span, info, info_span, warn};
use uuid::Uuid;

use crate::config::Profile;
use crate::mapper::{column_text, MappedRecord, Mapper};
use crate::notify::{self, CommsQueue, PendingComms};
use crate::parser::{self, ParsedRecord};
use crate::reconciler::{Action, ReconcileResult, Reconciler};
use crate::store::{columns, JobStore};

use super::config::RunOptions;
use super::context::RecordContext;
use super::error::{Alert, PipelineError, RecordError};
use super::report::{AbortReason, FileOutcome, FileReport};

/// Line that ends a file and triggers commit.
pub const TERMINATOR: &str = "%%EOF";

/// Loads T1250 files for one business unit. Each file is one transaction.
pub struct Pipeline<S: JobStore, Q: CommsQueue> {
    profile: Arc<Profile>,
    mapper: Mapper,
    store: S,
    queue: Q,
}

impl<S: JobStore, Q: CommsQueue> Pipeline<S, Q> {
    pub fn new(profile: Arc<Profile>, store: S, queue: Q) -> Self {
        let mapper = Mapper::from_profile(&profile);
        Self {
            profile,
            mapper,
            store,
            queue,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Reads a file and runs its lines. Invalid UTF-8 is replaced rather
    /// than rejected.
    pub fn run_file(&self, path: &Path, options: &RunOptions) -> Result<FileReport, PipelineError> {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        self.run_source(&path.display().to_string(), content.lines(), options)
    }

    pub fn run_lines<I, L>(
        &self,
        lines: I,
        options: &RunOptions,
    ) -> Result<FileReport, PipelineError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        self.run_source("<input>", lines, options)
    }

    fn run_source<I, L>(
        &self,
        source: &str,
        lines: I,
        options: &RunOptions,
    ) -> Result<FileReport, PipelineError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let run_id = Uuid::new_v4();
        let _file_span = info_span!("ingest_file",
            run_id = %run_id,
            file = %source,
            business_unit = %self.profile.business_unit,
        )
        .entered();

        let mut report = FileReport::new(run_id, source);
        let mut pending: Vec<(usize, PendingComms)> = Vec::new();
        let mut terminated = false;
        let mut cancelled = false;
        let mut ignored = 0usize;

        self.store.begin().map_err(PipelineError::Transaction)?;

        for (index, line) in lines.into_iter().enumerate() {
            let line_number = index + 1;
            let line = line.as_ref();

            if terminated {
                if !line.trim().is_empty() {
                    ignored += 1;
                }
                continue;
            }
            if options.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if line.trim() == TERMINATOR {
                terminated = true;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            report.records_read += 1;
            let markers = self.run_record(line_number, line, &mut report);
            pending.extend(markers.into_iter().map(|comms| (line_number, comms)));
        }

        if ignored > 0 {
            warn!(ignored, "Ignored lines after {}", TERMINATOR);
        }

        let abort = if cancelled {
            Some(AbortReason::Cancelled)
        } else if !terminated {
            Some(AbortReason::MissingTerminator)
        } else if options.dry_run {
            Some(AbortReason::DryRun)
        } else {
            None
        };

        report.markers = pending.iter().map(|(_, comms)| *comms).collect();

        match abort {
            None => {
                if let Err(e) = self.store.commit() {
                    if let Err(rollback) = self.store.rollback() {
                        warn!("Rollback after failed commit also failed: {}", rollback);
                    }
                    return Err(PipelineError::Transaction(e));
                }
                report.outcome = FileOutcome::Committed;
                self.flush_markers(&pending, &mut report);
            }
            Some(reason) => {
                self.store.rollback().map_err(PipelineError::Transaction)?;
                report.outcome = FileOutcome::RolledBack(reason);
                if reason == AbortReason::DryRun {
                    info!("Dry run, rolled back {}", source);
                } else {
                    warn!("Rolled back {}: {}", source, reason);
                }
            }
        }

        if !report.alerts.is_empty() {
            warn!("{}", report.alerts);
        }
        info!(
            records = report.records_read,
            jobs_created = report.jobs_created,
            jobs_updated = report.jobs_updated,
            items_created = report.items_created,
            markers = report.markers.len(),
            alerts = report.alerts.len(),
            committed = report.outcome.is_committed(),
            "Finished {}",
            source
        );

        Ok(report)
    }

    /// Runs one record inside its own savepoint. Returns the markers it
    /// produced; a rejected record is rolled back to the savepoint and
    /// recorded as an alert.
    fn run_record(
        &self,
        line_number: usize,
        line: &str,
        report: &mut FileReport,
    ) -> Vec<PendingComms> {
        let _record_span = debug_span!("record", line = line_number).entered();
        let mut ctx = RecordContext::new(line_number, line);

        if let Err(e) = self.store.savepoint() {
            self.alert(&ctx, e.into(), report);
            return Vec::new();
        }

        match self.process(&mut ctx) {
            Ok(()) => {
                self.count(&ctx, report);
                ctx.pending
            }
            Err(error) => {
                if let Err(e) = self.store.rollback_to_savepoint() {
                    warn!(line = line_number, "Failed to roll back record: {}", e);
                }
                self.alert(&ctx, error, report);
                Vec::new()
            }
        }
    }

    fn process(&self, ctx: &mut RecordContext<'_>) -> Result<(), RecordError> {
        let parsed = self.step_parse(ctx);
        let mapped = self.step_map(&parsed);
        ctx.parsed = Some(parsed);
        let mapped = mapped?;

        let result = self.step_reconcile(&mapped)?;
        ctx.pending = self.step_decide(&mapped, &result);
        ctx.mapped = Some(mapped);
        ctx.reconciled = Some(result);

        self.store.release_savepoint()?;
        Ok(())
    }

    fn step_parse(&self, ctx: &RecordContext<'_>) -> ParsedRecord {
        let parsed = parser::parse(ctx.line, &self.profile.fields);
        if !parsed.short_fields().is_empty() {
            debug!(
                line = ctx.line_number,
                "Record too short for {:?}",
                parsed.short_fields()
            );
        }
        parsed
    }

    /// Maps the record and checks it belongs to the file's business unit.
    fn step_map(&self, parsed: &ParsedRecord) -> Result<MappedRecord, RecordError> {
        let mapped = self.mapper.map_record(parsed, &self.profile.conditions)?;
        if let Some(found) = column_text(&mapped.job, columns::BU_ID) {
            if found.parse::<i64>().ok() != Some(self.profile.bu_id) {
                return Err(RecordError::BusinessUnitMismatch {
                    business_unit: self.profile.business_unit.clone(),
                    expected: self.profile.bu_id,
                    found: found.to_string(),
                });
            }
        }
        Ok(mapped)
    }

    fn step_reconcile(&self, mapped: &MappedRecord) -> Result<ReconcileResult, RecordError> {
        let result = Reconciler::new(&self.store).reconcile(&mapped.job, &mapped.item)?;
        debug!(
            action = ?result.action,
            job_id = result.job_id,
            item_created = result.item_created,
            manufactured = result.manufactured,
            "Reconciled"
        );
        Ok(result)
    }

    /// Markers for a newly created item. Updates never notify.
    fn step_decide(&self, mapped: &MappedRecord, result: &ReconcileResult) -> Vec<PendingComms> {
        let Some(item_id) = result.item_id.filter(|_| result.item_created) else {
            return Vec::new();
        };
        let decision = notify::decide(
            notify::service_code_of(&mapped.job),
            &self.profile.conditions,
        );
        notify::markers(&decision, item_id, &mapped.item)
    }

    fn count(&self, ctx: &RecordContext<'_>, report: &mut FileReport) {
        let Some(result) = &ctx.reconciled else {
            return;
        };
        match result.action {
            Action::Create => report.jobs_created += 1,
            Action::Update => report.jobs_updated += 1,
        }
        if result.item_created {
            report.items_created += 1;
        }
    }

    fn alert(&self, ctx: &RecordContext<'_>, error: RecordError, report: &mut FileReport) {
        let reference = self
            .profile
            .reference_field()
            .map(|field| ctx.field(field).to_string())
            .unwrap_or_default();
        debug!(line = ctx.line_number, "Record rejected: {}", error);
        report.alerts.push(Alert {
            line: ctx.line_number,
            reference,
            error,
        });
    }

    fn flush_markers(&self, pending: &[(usize, PendingComms)], report: &mut FileReport) {
        for (line, comms) in pending {
            if let Err(e) = self.queue.enqueue(comms) {
                warn!(line = *line, "Failed to queue {} notification: {}", comms.channel, e);
                report.alerts.push(Alert {
                    line: *line,
                    reference: comms.job_item_id.to_string(),
                    error: e.into(),
                });
            }
        }
    }
}
