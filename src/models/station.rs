use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ProcessingError, Result};

/// Ordered set of station names. The order is the column order of every
/// table built from the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSet {
    names: Vec<String>,
}

impl StationSet {
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(ProcessingError::InvalidSeries(
                    "Station name must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ProcessingError::InvalidSeries(format!(
                    "Duplicate station column: {}",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_order_is_preserved() {
        let stations =
            StationSet::new(vec!["Nantes".to_string(), "Angers".to_string()]).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations.name(0), Some("Nantes"));
        assert_eq!(stations.index_of("Angers"), Some(1));
        assert_eq!(stations.index_of("Brest"), None);
    }

    #[test]
    fn test_duplicate_station_rejected() {
        let result = StationSet::new(vec!["A".to_string(), "A".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_station_rejected() {
        let result = StationSet::new(vec!["A".to_string(), "  ".to_string()]);
        assert!(result.is_err());
    }
}
