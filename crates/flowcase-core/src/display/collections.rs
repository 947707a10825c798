//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper prints its items in listing form and a fixed message when
//! empty.

use std::{fmt, ops::Index};

use crate::models::{FlowRunEntry, FlowRunSummary, TestCase, TestSuite};

/// Defines a newtype over `Vec<$item>` with the usual read-only accessors.
macro_rules! collection {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name(pub Vec<$item>);

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

collection!(
    /// Test cases in listing form.
    TestCases,
    TestCase
);
collection!(
    /// Test suites in listing form.
    Suites,
    TestSuite
);
collection!(
    /// Flow run summaries with entry metrics.
    FlowRunSummaries,
    FlowRunSummary
);
collection!(
    /// Flow run entries, each with its steps.
    FlowRunEntries,
    FlowRunEntry
);
collection!(
    /// Sorted, deduplicated labels.
    Labels,
    String
);

impl fmt::Display for TestCases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No test cases found.");
        }
        for case in &self.0 {
            case.fmt_summary(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Suites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No test suites found.");
        }
        for suite in &self.0 {
            suite.fmt_summary(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for FlowRunSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No flow runs found.");
        }
        for run in &self.0 {
            write!(f, "{run}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FlowRunEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No entries.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No labels found.");
        }
        for label in &self.0 {
            writeln!(f, "- {label}")?;
        }
        Ok(())
    }
}
