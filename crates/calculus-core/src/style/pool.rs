//! Style pool for deduplication

use std::sync::Arc;

use super::Style;
use ahash::AHashMap;

/// Style pool for deduplicating styles
///
/// Readers intern every style they decode so that cells with identical formatting
/// share one `Arc<Style>`. Writers use the stable indices to build style tables.
#[derive(Debug)]
pub struct StylePool {
    /// All unique styles (index 0 is default)
    styles: Vec<Arc<Style>>,
    /// Fast lookup for deduplication
    index_map: AHashMap<Arc<Style>, u32>,
}

impl StylePool {
    /// Create a new style pool with default style at index 0
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::with_capacity(16),
            index_map: AHashMap::with_capacity(16),
        };
        pool.get_or_insert(Style::default());
        pool
    }

    /// Get or create a style, returning its index
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        let shared = Arc::new(style);
        self.index_map.insert(Arc::clone(&shared), idx);
        self.styles.push(shared);
        idx
    }

    /// Get or create a style, returning the shared instance
    pub fn intern(&mut self, style: Style) -> Arc<Style> {
        let idx = self.get_or_insert(style);
        Arc::clone(&self.styles[idx as usize])
    }

    /// Index of a style already in the pool
    pub fn index_of(&self, style: &Style) -> Option<u32> {
        self.index_map.get(style).copied()
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Arc<Style>> {
        self.styles.get(index as usize)
    }

    /// Get the number of styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the pool only has the default style
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Iterate over all styles with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Arc<Style>)> {
        self.styles.iter().enumerate().map(|(i, s)| (i as u32, s))
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert!(pool.is_empty());
        assert_eq!(pool.get(0).map(|s| s.as_ref()), Some(&Style::default()));
    }

    #[test]
    fn test_deduplication() {
        let mut pool = StylePool::new();

        let idx1 = pool.get_or_insert(Style::new().bold(true));
        let idx2 = pool.get_or_insert(Style::new().bold(true));
        let idx3 = pool.get_or_insert(Style::new().italic(true));

        assert_eq!(idx1, idx2);
        assert_ne!(idx1, idx3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.index_of(&Style::new().italic(true)), Some(idx3));
        assert_eq!(pool.index_of(&Style::new().font_size(30.0)), None);
    }

    #[test]
    fn test_intern_shares_instance() {
        let mut pool = StylePool::new();

        let a = pool.intern(Style::new().number_format("0.00%"));
        let b = pool.intern(Style::new().number_format("0.00%"));
        let c = pool.intern(Style::new().number_format("0.00"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
