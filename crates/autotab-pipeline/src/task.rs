use autotab_core::{DType, DataFrame};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Classification,
    Regression,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Classification => write!(f, "classification"),
            TaskType::Regression => write!(f, "regression"),
        }
    }
}

/// What the task decision needs to know about one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProbe {
    pub name: String,
    pub dtype: DType,
    /// Distinct non-missing values.
    pub cardinality: usize,
}

impl ColumnProbe {
    pub fn from_frame(frame: &DataFrame) -> Vec<ColumnProbe> {
        frame
            .columns()
            .iter()
            .map(|c| ColumnProbe {
                name: c.name().to_string(),
                dtype: c.dtype(),
                cardinality: c.n_unique(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolvable {
    NoTargetColumn,
    EmptyTarget { column: String },
}

impl fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolvable::NoTargetColumn => write!(f, "target not found"),
            Unresolvable::EmptyTarget { column } => {
                write!(f, "target column '{}' has no values", column)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDecision {
    Classification { target: String },
    Regression { target: String },
    Unresolvable(Unresolvable),
}

/// First column whose trimmed, lowercased name is one of `candidates`.
pub fn find_target<'a>(names: impl IntoIterator<Item = &'a str>, candidates: &[String]) -> Option<&'a str> {
    names.into_iter().find(|name| {
        let key = name.trim().to_lowercase();
        candidates.iter().any(|c| c.trim().to_lowercase() == key)
    })
}

/// Pick the target column and the task type.
///
/// Classification when the target is not numeric or has fewer than
/// `max_classes` distinct values; regression otherwise.
pub fn decide_task(columns: &[ColumnProbe], candidates: &[String], max_classes: usize) -> TaskDecision {
    let target = match find_target(columns.iter().map(|c| c.name.as_str()), candidates) {
        Some(t) => t,
        None => return TaskDecision::Unresolvable(Unresolvable::NoTargetColumn),
    };
    let probe = match columns.iter().find(|c| c.name == target) {
        Some(p) => p,
        None => return TaskDecision::Unresolvable(Unresolvable::NoTargetColumn),
    };
    if probe.cardinality == 0 {
        return TaskDecision::Unresolvable(Unresolvable::EmptyTarget {
            column: probe.name.clone(),
        });
    }

    let target = probe.name.clone();
    if !probe.dtype.is_numeric() || probe.cardinality < max_classes {
        TaskDecision::Classification { target }
    } else {
        TaskDecision::Regression { target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_CLASSIFICATION_CARDINALITY;

    fn probe(name: &str, dtype: DType, cardinality: usize) -> ColumnProbe {
        ColumnProbe {
            name: name.to_string(),
            dtype,
            cardinality,
        }
    }

    fn candidates() -> Vec<String> {
        vec!["target".to_string(), "label".to_string()]
    }

    #[test]
    fn test_text_target_is_classification() {
        let cols = [probe("x", DType::Float, 100), probe(" Label ", DType::Text, 3)];
        assert_eq!(
            decide_task(&cols, &candidates(), MAX_CLASSIFICATION_CARDINALITY),
            TaskDecision::Classification { target: " Label ".into() }
        );
    }

    #[test]
    fn test_cardinality_threshold() {
        let few = [probe("target", DType::Int, 19)];
        let many = [probe("target", DType::Float, 20)];
        assert!(matches!(
            decide_task(&few, &candidates(), 20),
            TaskDecision::Classification { .. }
        ));
        assert!(matches!(
            decide_task(&many, &candidates(), 20),
            TaskDecision::Regression { .. }
        ));
    }

    #[test]
    fn test_first_matching_column_wins() {
        let cols = [probe("label", DType::Text, 2), probe("TARGET", DType::Float, 500)];
        assert_eq!(
            decide_task(&cols, &candidates(), 20),
            TaskDecision::Classification { target: "label".into() }
        );
    }

    #[test]
    fn test_unresolvable() {
        let cols = [probe("y", DType::Float, 10)];
        assert_eq!(
            decide_task(&cols, &candidates(), 20),
            TaskDecision::Unresolvable(Unresolvable::NoTargetColumn)
        );
        let empty = [probe("target", DType::Float, 0)];
        assert!(matches!(
            decide_task(&empty, &candidates(), 20),
            TaskDecision::Unresolvable(Unresolvable::EmptyTarget { .. })
        ));
        assert_eq!(Unresolvable::NoTargetColumn.to_string(), "target not found");
    }
}
