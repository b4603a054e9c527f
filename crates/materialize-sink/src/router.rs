//! Record classification.
//!
//! Create and snapshot records insert, updates update, deletes delete. A
//! metadata `action` takes precedence over the operation tag; an action the
//! destination does not know rejects the record instead of guessing.

use crate::error::RecordError;
use sink_core::{Operation, Record};
use std::fmt;

/// Statement kind a record is applied with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Insert,
    Update,
    Delete,
}

impl Route {
    /// Route for an operation tag.
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Create | Operation::Snapshot => Self::Insert,
            Operation::Update => Self::Update,
            Operation::Delete => Self::Delete,
        }
    }

    fn for_action(action: &str) -> Result<Self, RecordError> {
        match action.to_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(RecordError::UnsupportedAction(action.to_string())),
        }
    }

    /// Classify a record.
    pub fn of(record: &Record) -> Result<Self, RecordError> {
        match record.action() {
            Some(action) => Self::for_action(action),
            None => Ok(Self::for_operation(record.operation)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sink_core::METADATA_ACTION;

    #[test]
    fn test_operations() {
        let cases = [
            (Operation::Create, Route::Insert),
            (Operation::Snapshot, Route::Insert),
            (Operation::Update, Route::Update),
            (Operation::Delete, Route::Delete),
        ];
        for (operation, route) in cases {
            assert_eq!(Route::of(&Record::new(operation)).unwrap(), route);
        }
    }

    #[test]
    fn test_action_overrides_operation() {
        let record = Record::new(Operation::Create).with_metadata(METADATA_ACTION, "DELETE");
        assert_eq!(Route::of(&record).unwrap(), Route::Delete);

        let record = Record::new(Operation::Delete).with_metadata(METADATA_ACTION, "insert");
        assert_eq!(Route::of(&record).unwrap(), Route::Insert);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let record = Record::new(Operation::Create).with_metadata(METADATA_ACTION, "merge");
        assert!(matches!(
            Route::of(&record),
            Err(RecordError::UnsupportedAction(action)) if action == "merge"
        ));
    }
}
