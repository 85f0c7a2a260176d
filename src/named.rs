use std::collections::HashMap;

/// Name-keyed collection that remembers insertion order.
///
/// Used for the methods, events and errors of an ABI, and for decoded values
/// keyed by parameter name.
#[derive(Debug, Clone)]
pub struct NamedMap<T> {
    entries: Vec<(String, T)>,
    positions: HashMap<String, usize>,
}

impl<T> NamedMap<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), positions: HashMap::new() }
    }

    /// Appends `value` under `name`, handing it back if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Result<(), T> {
        let name = name.into();
        if self.positions.contains_key(&name) {
            return Err(value);
        }
        self.positions.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    /// Swaps the value stored under `name` in place, keeping its position.
    pub(crate) fn replace(&mut self, name: &str, value: T) -> Option<T> {
        let position = *self.positions.get(name)?;
        Some(std::mem::replace(&mut self.entries[position].1, value))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.positions.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|(_, value)| value)
    }
}

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for NamedMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<'a, T> IntoIterator for &'a NamedMap<T> {
    type Item = (&'a str, &'a T);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a T)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
