use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// One value per key of the owning table, in the same order as the keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn project(&self, indices: &[usize]) -> Row {
        //! Copy the values at `indices` into a new row, in the order given.

        Row(indices
            .iter()
            .filter_map(|&index| self.0.get(index).cloned())
            .collect())
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row(values)
    }
}

/// Build a [`Row`] from anything convertible into a [`Value`].
///
/// ```
/// use tabula_engine::{row, persistence::Value};
///
/// let r = row![1, "Jansen", None::<i32>];
/// assert_eq!(r.at(2), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        $crate::persistence::Row(vec![$($crate::persistence::Value::from($value)),*])
    };
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row: Vec<String> = self.0.iter().map(|value| value.to_string()).collect();
        write!(f, "{}", row.join(" | "))
    }
}
