// src/registry.rs

// Name -> plotted object bookkeeping.
//
// Entries live in one insertion-ordered map. A handle's index is its 1-based
// position in that map, so deleting an entry shifts every later entry down by
// one and the index sequence stays dense without a separate renumbering pass.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{PlotError, Result};

/// Addresses a registered handle either by name or by 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for HandleKey<'a> {
    fn from(name: &'a str) -> Self {
        HandleKey::Name(name)
    }
}

impl<'a> From<&'a String> for HandleKey<'a> {
    fn from(name: &'a String) -> Self {
        HandleKey::Name(name.as_str())
    }
}

impl From<usize> for HandleKey<'_> {
    fn from(index: usize) -> Self {
        HandleKey::Index(index)
    }
}

impl fmt::Display for HandleKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKey::Name(name) => write!(f, "name '{name}'"),
            HandleKey::Index(index) => write!(f, "index {index}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HandleRegistry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self { entries: IndexMap::new() }
    }
}

impl<T> HandleRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registers `reference` and returns its 1-based index.
    ///
    /// An empty name is replaced by the next free number, starting at `len + 1`.
    /// Registering an explicit name twice is an error; the existing entry is kept.
    pub fn add(&mut self, reference: T, name: &str) -> Result<usize> {
        let name = if name.is_empty() {
            self.next_auto_name()
        } else if self.entries.contains_key(name) {
            return Err(PlotError::DuplicateName(name.to_string()));
        } else {
            name.to_string()
        };
        self.entries.insert(name, reference);
        Ok(self.entries.len())
    }

    fn next_auto_name(&self) -> String {
        let mut candidate = self.entries.len() + 1;
        while self.entries.contains_key(candidate.to_string().as_str()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn position<'k>(&self, key: impl Into<HandleKey<'k>>) -> Result<usize> {
        let key = key.into();
        let found = match key {
            HandleKey::Name(name) => self.entries.get_index_of(name),
            HandleKey::Index(index) => index.checked_sub(1).filter(|p| *p < self.entries.len()),
        };
        found.ok_or_else(|| PlotError::NotFound(key.to_string()))
    }

    pub fn get<'k>(&self, key: impl Into<HandleKey<'k>>) -> Result<&T> {
        let pos = self.position(key)?;
        Ok(&self.entries[pos])
    }

    pub fn get_mut<'k>(&mut self, key: impl Into<HandleKey<'k>>) -> Result<&mut T> {
        let pos = self.position(key)?;
        Ok(&mut self.entries[pos])
    }

    /// 1-based index of a registered name.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.position(name).map(|p| p + 1)
    }

    /// Name registered at a 1-based index.
    pub fn name_of(&self, index: usize) -> Result<&str> {
        let pos = self.position(index)?;
        self.entries
            .get_index(pos)
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| PlotError::NotFound(HandleKey::Index(index).to_string()))
    }

    /// Removes the entry and returns its reference. Later entries move down by one.
    pub fn delete<'k>(&mut self, key: impl Into<HandleKey<'k>>) -> Result<(String, T)> {
        let pos = self.position(key)?;
        self.entries
            .shift_remove_index(pos)
            .ok_or_else(|| PlotError::NotFound(HandleKey::Index(pos + 1).to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(index, name, reference)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(pos, (name, reference))| (pos + 1, name.as_str(), reference))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &str, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .map(|(pos, (name, reference))| (pos + 1, name.as_str(), reference))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(reg: &HandleRegistry<u32>) -> Vec<(usize, String)> {
        reg.iter().map(|(i, n, _)| (i, n.to_string())).collect()
    }

    #[test]
    fn test_auto_names_follow_count() {
        let mut reg = HandleRegistry::new();
        assert_eq!(reg.add(10u32, "").unwrap(), 1);
        assert_eq!(reg.add(20u32, "").unwrap(), 2);
        assert_eq!(reg.name_of(2).unwrap(), "2");
        assert_eq!(*reg.get("1").unwrap(), 10);
    }

    #[test]
    fn test_auto_name_skips_taken_numbers() {
        let mut reg = HandleRegistry::new();
        reg.add(1u32, "2").unwrap();
        reg.add(2u32, "").unwrap();
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["2", "3"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut reg = HandleRegistry::new();
        reg.add(1u32, "A").unwrap();
        assert!(matches!(reg.add(2u32, "A"), Err(PlotError::DuplicateName(n)) if n == "A"));
        assert_eq!(reg.len(), 1);
        assert_eq!(*reg.get("A").unwrap(), 1);
    }

    #[test]
    fn test_delete_shifts_later_indices() {
        let mut reg = HandleRegistry::new();
        for name in ["a", "b", "c", "d"] {
            reg.add(0u32, name).unwrap();
        }
        let (removed, _) = reg.delete(2usize).unwrap();
        assert_eq!(removed, "b");
        assert_eq!(
            indices(&reg),
            vec![(1, "a".into()), (2, "c".into()), (3, "d".into())]
        );
        assert_eq!(reg.index_of("d").unwrap(), 3);
    }

    #[test]
    fn test_lookup_failures() {
        let mut reg: HandleRegistry<u32> = HandleRegistry::new();
        assert!(matches!(reg.get(0usize), Err(PlotError::NotFound(_))));
        reg.add(1, "x").unwrap();
        assert!(reg.get(2usize).is_err());
        assert!(reg.get("y").is_err());
        assert!(reg.delete("y").is_err());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_dense_under_mixed_operations() {
        let mut reg = HandleRegistry::new();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for step in 0..500u32 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if reg.is_empty() || state % 3 != 0 {
                reg.add(step, "").unwrap();
            } else {
                let k = (state as usize % reg.len()) + 1;
                let before = indices(&reg);
                reg.delete(k).unwrap();
                let after = indices(&reg);
                for (i, name) in &before {
                    if *i < k {
                        assert!(after.contains(&(*i, name.clone())));
                    } else if *i > k {
                        assert!(after.contains(&(*i - 1, name.clone())));
                    }
                }
            }
            let idx: Vec<usize> = reg.iter().map(|(i, _, _)| i).collect();
            assert_eq!(idx, (1..=reg.len()).collect::<Vec<_>>());
            let mut names: Vec<&str> = reg.names().collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), reg.len());
        }
    }
}
