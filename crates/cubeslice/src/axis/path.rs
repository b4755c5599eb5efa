//! `CubePath`: an ordered axis → value assignment.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::value::Coord;

/// Ordered axis → coordinate mapping (root-to-leaf order in a tree, raw
/// dataset order once adjusted for the accessor).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CubePath(Vec<(String, Coord)>);

impl CubePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: &str) -> Option<&Coord> {
        self.0.iter().find(|(a, _)| a == axis).map(|(_, v)| v)
    }

    pub fn position(&self, axis: &str) -> Option<usize> {
        self.0.iter().position(|(a, _)| a == axis)
    }

    /// Set `axis`, replacing in place when present, appending otherwise.
    pub fn insert(&mut self, axis: impl Into<String>, value: Coord) {
        let axis = axis.into();
        match self.position(&axis) {
            Some(i) => self.0[i].1 = value,
            None => self.0.push((axis, value)),
        }
    }

    /// Insert at `index` (clamped), dropping any previous entry for `axis`.
    pub fn insert_at(&mut self, index: usize, axis: impl Into<String>, value: Coord) {
        let axis = axis.into();
        let mut index = index;
        if let Some(i) = self.position(&axis) {
            self.0.remove(i);
            if i < index {
                index -= 1;
            }
        }
        let index = index.min(self.0.len());
        self.0.insert(index, (axis, value));
    }

    pub fn remove(&mut self, axis: &str) -> Option<Coord> {
        self.position(axis).map(|i| self.0.remove(i).1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Coord)> {
        self.0.iter().map(|(a, v)| (a.as_str(), v))
    }

    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(a, _)| a.as_str())
    }
}

impl FromIterator<(String, Coord)> for CubePath {
    fn from_iter<I: IntoIterator<Item = (String, Coord)>>(iter: I) -> Self {
        let mut p = CubePath::new();
        for (a, v) in iter {
            p.insert(a, v);
        }
        p
    }
}

impl Serialize for CubePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (a, v) in &self.0 {
            map.serialize_entry(a, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_at_moves_existing_entry() {
        let mut p: CubePath = [("a", 1.0), ("b", 2.0), ("c", 3.0)]
            .into_iter()
            .map(|(a, v)| (a.to_string(), Coord::Num(v)))
            .collect();
        p.insert_at(0, "c", Coord::Num(4.0));
        assert_eq!(p.axes().collect::<Vec<_>>(), ["c", "a", "b"]);
        p.insert_at(9, "d", Coord::Num(5.0));
        assert_eq!(p.position("d"), Some(3));
        assert_eq!(p.remove("a"), Some(Coord::Num(1.0)));
        assert_eq!(p.len(), 3);
        let js = serde_json::to_string(&p).unwrap();
        assert_eq!(js, r#"{"c":4.0,"b":2.0,"d":5.0}"#);
    }
}
