//! File id lists such as `1,4-7`

use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;

/// Most ids a single filter may select
pub const MAX_FILES: usize = 1 << 20;

/// Errors from parsing a file id list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("empty file list")]
    Empty,

    #[error("invalid file id '{0}'")]
    InvalidId(String),

    #[error("range {start}-{end} is reversed")]
    ReversedRange { start: u32, end: u32 },

    #[error("file list selects more than {MAX_FILES} ids")]
    TooMany,
}

/// Sorted, deduplicated set of file ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    ids: BTreeSet<u32>,
}

impl FileFilter {
    /// Ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn parse_id(text: &str) -> Result<u32, FilterError> {
    text.trim()
        .parse()
        .map_err(|_| FilterError::InvalidId(text.trim().to_string()))
}

impl FromStr for FileFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ids = BTreeSet::new();

        for part in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse_id(start)?, parse_id(end)?);
                    if start > end {
                        return Err(FilterError::ReversedRange { start, end });
                    }
                    let span = usize::try_from(end - start)
                        .map_or(usize::MAX, |n| n.saturating_add(1));
                    if ids.len().saturating_add(span) > MAX_FILES {
                        return Err(FilterError::TooMany);
                    }
                    ids.extend(start..=end);
                }
                None => {
                    ids.insert(parse_id(part)?);
                    if ids.len() > MAX_FILES {
                        return Err(FilterError::TooMany);
                    }
                }
            }
        }

        if ids.is_empty() {
            return Err(FilterError::Empty);
        }
        Ok(Self { ids })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(filter: &str) -> Vec<u32> {
        filter.parse::<FileFilter>().unwrap().ids().collect()
    }

    #[test]
    fn test_single_and_list() {
        assert_eq!(ids("3"), vec![3]);
        assert_eq!(ids("9, 1,5"), vec![1, 5, 9]);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(ids("1,4-7"), vec![1, 4, 5, 6, 7]);
        assert_eq!(ids("6-6"), vec![6]);
        assert_eq!(ids("4-6,5,1"), vec![1, 4, 5, 6]);
    }

    #[test]
    fn test_errors() {
        assert_eq!("".parse::<FileFilter>(), Err(FilterError::Empty));
        assert_eq!(" , ".parse::<FileFilter>(), Err(FilterError::Empty));
        assert_eq!(
            "1,x".parse::<FileFilter>(),
            Err(FilterError::InvalidId("x".to_string()))
        );
        assert_eq!(
            "7-4".parse::<FileFilter>(),
            Err(FilterError::ReversedRange { start: 7, end: 4 })
        );
        assert!("-3".parse::<FileFilter>().is_err());
    }

    #[test]
    fn test_range_size_is_capped() {
        assert_eq!(
            "0-4294967295".parse::<FileFilter>(),
            Err(FilterError::TooMany)
        );
        assert_eq!(
            "5,0-1048575".parse::<FileFilter>(),
            Err(FilterError::TooMany)
        );

        let max = u32::try_from(MAX_FILES - 1).unwrap();
        assert_eq!(format!("0-{max}").parse::<FileFilter>().unwrap().len(), MAX_FILES);
    }
}
