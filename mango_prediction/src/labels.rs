use std::{collections::HashSet, fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Failed to read labels file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Labels file contains no labels")]
    Empty,
    #[error("Duplicate label: {0}")]
    Duplicate(String),
}

/// Class names in model output order: index `i` of the output vector is
/// `labels[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(LabelError::Duplicate(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    /// One label per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let labels = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();

        Self::new(labels)
    }

    pub fn load(filepath: &Path) -> Result<Self, LabelError> {
        let text = fs::read_to_string(filepath)?;
        let label_set = Self::parse(&text)?;
        tracing::info!(
            "Loaded {} labels from {:?}",
            label_set.len(),
            filepath
        );
        Ok(label_set)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
