use crate::mapper::MappedRecord;
use crate::notify::PendingComms;
use crate::parser::ParsedRecord;
use crate::reconciler::ReconcileResult;

pub struct RecordContext<'a> {
    // Input
    pub line_number: usize,
    pub line: &'a str,

    // Set by step_parse
    pub parsed: Option<ParsedRecord>,

    // Set by step_map
    pub mapped: Option<MappedRecord>,

    // Set by step_reconcile
    pub reconciled: Option<ReconcileResult>,

    // Set by step_decide, queued only once the file commits
    pub pending: Vec<PendingComms>,
}

impl<'a> RecordContext<'a> {
    pub fn new(line_number: usize, line: &'a str) -> Self {
        Self {
            line_number,
            line,
            parsed: None,
            mapped: None,
            reconciled: None,
            pending: Vec::new(),
        }
    }

    /// Value of `field` in the parsed record, empty before parsing.
    pub fn field(&self, field: &str) -> &str {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.value(field))
            .unwrap_or_default()
    }
}
