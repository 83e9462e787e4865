//! Stable anchor ids for DOM elements.

use kudos_core::embed::AnchorId;

/// Assigns each distinct element an [`AnchorId`] the first time it is seen.
///
/// Elements are compared with `==`, which for DOM handles is identity.
/// Entries live as long as the page; anchors are few.
#[derive(Debug)]
pub struct ElementRegistry<E> {
    entries: Vec<E>,
}

impl<E> Default for ElementRegistry<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: PartialEq + Clone> ElementRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `element`, registering it if it is new.
    pub fn id_for(&mut self, element: &E) -> AnchorId {
        if let Some(idx) = self.entries.iter().position(|e| e == element) {
            return AnchorId(idx as u64);
        }
        self.entries.push(element.clone());
        AnchorId((self.entries.len() - 1) as u64)
    }

    pub fn get(&self, id: AnchorId) -> Option<&E> {
        usize::try_from(id.0).ok().and_then(|idx| self.entries.get(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_element_keeps_its_id() {
        let mut registry = ElementRegistry::new();
        let a = registry.id_for(&"a");
        let b = registry.id_for(&"b");

        assert_ne!(a, b);
        assert_eq!(registry.id_for(&"a"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_returns_registered_element() {
        let mut registry = ElementRegistry::new();
        let id = registry.id_for(&String::from("anchor"));

        assert_eq!(registry.get(id).map(String::as_str), Some("anchor"));
        assert_eq!(registry.get(AnchorId(99)), None);
    }
}
