//! Rule Scanner
//!
//! Walks each argument once and records every disallowed character. Scanning
//! is pure: it reads one occurrence and returns a fresh list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::rule::{PositionMode, Rule};
use crate::source::{AnnotationOccurrence, FileId};

/// One disallowed character found in one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Violation {
    pub file: FileId,
    /// Absolute byte offset the diagnostic is anchored at
    pub position: usize,
    pub offending_character: char,
    pub argument_text: String,
    /// Character index within the argument
    pub index_within_argument: usize,
}

/// Scanning failures
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan cancelled after {completed} of {total} occurrences")]
    Cancelled { completed: usize, total: usize },
    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Cooperative cancellation checked between occurrences
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scan a single occurrence
///
/// Violations come out in increasing character index. Under
/// [`PositionMode::ViolationCount`] the n-th violation (from zero) sits at
/// `target_start_offset + n`; under [`PositionMode::CharacterIndex`] at
/// `target_start_offset + index`.
pub fn scan(occurrence: &AnnotationOccurrence, rule: &Rule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (index, ch) in occurrence.argument_text.chars().enumerate() {
        if !rule.is_disallowed(ch) {
            continue;
        }

        let offset = match rule.position_mode {
            PositionMode::ViolationCount => violations.len(),
            PositionMode::CharacterIndex => index,
        };

        violations.push(Violation {
            file: occurrence.file,
            position: occurrence.target_start_offset + offset,
            offending_character: ch,
            argument_text: occurrence.argument_text.clone(),
            index_within_argument: index,
        });
    }

    violations
}

/// Scan occurrences in order and concatenate the results
pub fn scan_all(occurrences: &[AnnotationOccurrence], rule: &Rule) -> Vec<Violation> {
    occurrences
        .iter()
        .flat_map(|occurrence| scan(occurrence, rule))
        .collect()
}

/// Like [`scan_all`], checking `cancel` before each occurrence
pub fn scan_all_cancellable(
    occurrences: &[AnnotationOccurrence],
    rule: &Rule,
    cancel: &CancellationFlag,
) -> Result<Vec<Violation>, ScanError> {
    let mut violations = Vec::new();

    for (completed, occurrence) in occurrences.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled {
                completed,
                total: occurrences.len(),
            });
        }
        violations.extend(scan(occurrence, rule));
    }

    Ok(violations)
}

/// Scan occurrences on the tokio runtime, one task per chunk
///
/// Results are merged in input order, so the output matches
/// [`scan_all`] regardless of which task finishes first.
pub async fn scan_parallel(
    occurrences: Vec<AnnotationOccurrence>,
    rule: Arc<Rule>,
    chunk_size: usize,
) -> Result<Vec<Violation>, ScanError> {
    let chunk_size = chunk_size.max(1);
    let mut tasks = JoinSet::new();

    let mut remaining = occurrences;
    let mut chunk_index = 0;
    while !remaining.is_empty() {
        let rest = remaining.split_off(chunk_size.min(remaining.len()));
        let chunk = std::mem::replace(&mut remaining, rest);
        let rule = Arc::clone(&rule);

        tasks.spawn(async move { (chunk_index, scan_all(&chunk, &rule)) });
        chunk_index += 1;
    }

    let mut results: Vec<Option<Vec<Violation>>> = vec![None; chunk_index];
    while let Some(joined) = tasks.join_next().await {
        let (index, violations) = joined?;
        results[index] = Some(violations);
    }

    log::trace!("merged {} scan chunks", results.len());
    Ok(results.into_iter().flatten().flatten().collect())
}
