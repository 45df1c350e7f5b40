use std::collections::HashMap;
use std::ops::Range;

use crate::error::DiffError;
use crate::myers::{Step, shortest_edit};
use crate::tokenizer::Token;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EditKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl EditKind {
    pub fn name(self) -> &'static str {
        match self {
            EditKind::Equal => "equal",
            EditKind::Insert => "insert",
            EditKind::Delete => "delete",
            EditKind::Replace => "replace",
        }
    }
}

/// One operation of an edit script, bound to a range on each side.
///
/// `Insert` normally has `old_len == 0` and `Delete` has `new_len == 0`; a
/// replacement whose one side holds only empty tokens is reported as an
/// insert or delete but keeps both of its ranges.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EditOp {
    pub kind: EditKind,
    pub old_index: usize,
    pub old_len: usize,
    pub new_index: usize,
    pub new_len: usize,
}

impl EditOp {
    pub fn old_range(&self) -> Range<usize> {
        self.old_index..self.old_index + self.old_len
    }

    pub fn new_range(&self) -> Range<usize> {
        self.new_index..self.new_index + self.new_len
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiffStats {
    pub equal: usize,
    pub inserted: usize,
    pub deleted: usize,
    /// Old-side tokens covered by replacements.
    pub replaced_old: usize,
    /// New-side tokens covered by replacements.
    pub replaced_new: usize,
}

impl DiffStats {
    pub fn has_changes(&self) -> bool {
        self.inserted + self.deleted + self.replaced_old + self.replaced_new > 0
    }
}

/// Ordered list of operations that partitions both token sequences.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditScript {
    ops: Vec<EditOp>,
}

impl EditScript {
    pub fn new(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.kind == EditKind::Equal)
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for op in &self.ops {
            match op.kind {
                EditKind::Equal => stats.equal += op.old_len,
                EditKind::Insert => stats.inserted += op.new_len,
                EditKind::Delete => stats.deleted += op.old_len,
                EditKind::Replace => {
                    stats.replaced_old += op.old_len;
                    stats.replaced_new += op.new_len;
                }
            }
        }
        stats
    }

    /// Checks that the old ranges tile `0..old_len` and the new ranges tile
    /// `0..new_len`, in order and without gaps or overlaps.
    pub fn validate(&self, old_len: usize, new_len: usize) -> Result<(), DiffError> {
        let mut old_cursor = 0;
        let mut new_cursor = 0;
        for (idx, op) in self.ops.iter().enumerate() {
            if op.old_index != old_cursor {
                return Err(broken("old", idx, op.old_index, old_cursor));
            }
            if op.new_index != new_cursor {
                return Err(broken("new", idx, op.new_index, new_cursor));
            }
            if op.kind == EditKind::Equal && op.old_len != op.new_len {
                return Err(DiffError::BrokenScript {
                    side: "old",
                    detail: format!(
                        "equal operation {} spans {} old and {} new tokens",
                        idx, op.old_len, op.new_len
                    ),
                });
            }
            old_cursor += op.old_len;
            new_cursor += op.new_len;
        }
        if old_cursor != old_len {
            return Err(DiffError::BrokenScript {
                side: "old",
                detail: format!("covers {} of {} tokens", old_cursor, old_len),
            });
        }
        if new_cursor != new_len {
            return Err(DiffError::BrokenScript {
                side: "new",
                detail: format!("covers {} of {} tokens", new_cursor, new_len),
            });
        }
        Ok(())
    }
}

fn broken(side: &'static str, idx: usize, found: usize, expected: usize) -> DiffError {
    DiffError::BrokenScript {
        side,
        detail: format!(
            "operation {} starts at {} but the previous one ended at {}",
            idx, found, expected
        ),
    }
}

/// Computes a minimal edit script between two token sequences, comparing
/// tokens by exact text.
pub fn diff_tokens(old: &[Token<'_>], new: &[Token<'_>]) -> Result<EditScript, DiffError> {
    let (old_ids, new_ids) = intern(old, new);
    let steps = shortest_edit(&old_ids, &new_ids);
    let mut ops = group_steps(&steps);
    demote_empty_sides(&mut ops, old, new);
    let script = EditScript::new(ops);
    script.validate(old.len(), new.len())?;
    Ok(script)
}

/// Maps each distinct token text to a small integer so the search compares ids.
fn intern<'a>(old: &[Token<'a>], new: &[Token<'a>]) -> (Vec<u32>, Vec<u32>) {
    let mut table: HashMap<&'a str, u32> = HashMap::new();
    let mut ids = |tokens: &[Token<'a>]| -> Vec<u32> {
        tokens
            .iter()
            .map(|token| {
                let next = table.len() as u32;
                *table.entry(token.text).or_insert(next)
            })
            .collect()
    };
    let old_ids = ids(old);
    let new_ids = ids(new);
    (old_ids, new_ids)
}

/// Folds per-token steps into maximal runs. A changed run that both deletes
/// and inserts becomes one replacement.
fn group_steps(steps: &[Step]) -> Vec<EditOp> {
    let mut ops = Vec::new();
    let (mut old_pos, mut new_pos) = (0, 0);
    let mut i = 0;
    while i < steps.len() {
        let (old_start, new_start) = (old_pos, new_pos);
        if steps[i] == Step::Equal {
            while i < steps.len() && steps[i] == Step::Equal {
                old_pos += 1;
                new_pos += 1;
                i += 1;
            }
            ops.push(EditOp {
                kind: EditKind::Equal,
                old_index: old_start,
                old_len: old_pos - old_start,
                new_index: new_start,
                new_len: new_pos - new_start,
            });
            continue;
        }
        while i < steps.len() && steps[i] != Step::Equal {
            match steps[i] {
                Step::Delete => old_pos += 1,
                Step::Insert => new_pos += 1,
                Step::Equal => unreachable!("loop stops at equal steps"),
            }
            i += 1;
        }
        let old_len = old_pos - old_start;
        let new_len = new_pos - new_start;
        let kind = match (old_len, new_len) {
            (0, _) => EditKind::Insert,
            (_, 0) => EditKind::Delete,
            _ => EditKind::Replace,
        };
        ops.push(EditOp {
            kind,
            old_index: old_start,
            old_len,
            new_index: new_start,
            new_len,
        });
    }
    ops
}

fn demote_empty_sides(ops: &mut [EditOp], old: &[Token<'_>], new: &[Token<'_>]) {
    let text_len = |tokens: &[Token<'_>]| tokens.iter().map(|token| token.text.len()).sum::<usize>();
    for op in ops.iter_mut().filter(|op| op.kind == EditKind::Replace) {
        if text_len(&old[op.old_range()]) == 0 {
            op.kind = EditKind::Insert;
        } else if text_len(&new[op.new_range()]) == 0 {
            op.kind = EditKind::Delete;
        }
    }
}
