use std::collections::{BTreeSet, HashMap};

/// Maps location names to the integer codes models were trained on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationEncoder {
    codes: HashMap<String, usize>,
}

impl LocationEncoder {
    /// Assign codes by sorted name, as a label encoder fitted on `names` would.
    pub fn fit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self::from_vocabulary(sorted)
    }

    /// Use a recorded vocabulary as-is: the code is the position.
    pub fn from_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes = HashMap::new();
        for name in vocabulary {
            let next = codes.len();
            codes.entry(name.into()).or_insert(next);
        }
        Self { codes }
    }

    pub fn encode(&self, location: &str) -> Option<f64> {
        self.codes.get(location).map(|code| *code as f64)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
