use std::ops::Range;

use crate::tokenizer::Token;

/// A fixed-size array of token slots.
///
/// Slots are never inserted or removed, so indices from an edit script stay
/// valid while annotation rewrites the sequence. A slot is either untouched,
/// holds the marked text of a whole folded run, or is a tombstone that
/// contributes nothing to the output.
#[derive(Clone, Debug)]
pub struct TokenSequence<'a> {
    slots: Box<[Slot<'a>]>,
}

#[derive(Clone, Debug)]
struct Slot<'a> {
    token: Token<'a>,
    state: SlotState,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum SlotState {
    Original,
    Marked(String),
    Tombstone,
}

impl<'a> TokenSequence<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        let slots = tokens
            .into_iter()
            .map(|token| Slot {
                token,
                state: SlotState::Original,
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn token(&self, index: usize) -> Option<&Token<'a>> {
        self.slots.get(index).map(|slot| &slot.token)
    }

    /// The tokens as originally produced, ignoring annotation.
    pub fn tokens(&self) -> impl Iterator<Item = &Token<'a>> + '_ {
        self.slots.iter().map(|slot| &slot.token)
    }

    /// Current text of a slot: the token text, its marked run, or `""`.
    pub fn text(&self, index: usize) -> &str {
        match self.slots.get(index).map(|slot| (&slot.state, slot.token.text)) {
            Some((SlotState::Original, text)) => text,
            Some((SlotState::Marked(marked), _)) => marked.as_str(),
            Some((SlotState::Tombstone, _)) | None => "",
        }
    }

    pub fn is_tombstone(&self, index: usize) -> bool {
        matches!(
            self.slots.get(index).map(|slot| &slot.state),
            Some(SlotState::Tombstone)
        )
    }

    pub(crate) fn text_len(&self, range: Range<usize>) -> usize {
        range.map(|index| self.text(index).len()).sum()
    }

    pub(crate) fn concat(&self, range: Range<usize>) -> String {
        let mut out = String::with_capacity(self.text_len(range.clone()));
        for index in range {
            out.push_str(self.text(index));
        }
        out
    }

    /// Writes `marked` into the first slot of `range` and tombstones the rest.
    pub(crate) fn fold(&mut self, range: Range<usize>, marked: String) {
        let Some(first) = self.slots.get_mut(range.start) else {
            return;
        };
        first.state = SlotState::Marked(marked);
        let end = range.end.min(self.slots.len());
        for slot in self.slots.iter_mut().take(end).skip(range.start + 1) {
            slot.state = SlotState::Tombstone;
        }
    }
}

/// Concatenates the current text of every slot, in index order.
pub fn reassemble(sequence: &TokenSequence<'_>) -> String {
    let mut out = String::new();
    for index in 0..sequence.len() {
        out.push_str(sequence.text(index));
    }
    out
}
