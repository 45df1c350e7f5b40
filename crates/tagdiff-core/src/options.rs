use crate::annotate::{AnnotateOptions, ChangeStyle, MarkerSet, WrapMode};
use crate::error::DiffError;
use crate::tokenizer::{Granularity, TokenizeOptions};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiffOptions {
    pub granularity: Granularity,
    pub tokenize: TokenizeOptions,
    pub annotate: AnnotateOptions,
}

impl DiffOptions {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_terminators(mut self, terminators: impl IntoIterator<Item = char>) -> Self {
        self.tokenize.terminators = terminators.into_iter().collect();
        self
    }

    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.annotate.markers = markers;
        self
    }

    pub fn with_change_style(mut self, change_style: ChangeStyle) -> Self {
        self.annotate.change_style = change_style;
        self
    }

    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.annotate.wrap_mode = wrap_mode;
        self
    }

    pub fn validate(&self) -> Result<(), DiffError> {
        self.annotate
            .markers
            .validate()
            .map_err(DiffError::InvalidOptions)?;
        if self.granularity == Granularity::BySentence && self.tokenize.terminators.is_empty() {
            return Err(DiffError::InvalidOptions(
                "sentence granularity needs at least one terminator".to_string(),
            ));
        }
        Ok(())
    }
}
