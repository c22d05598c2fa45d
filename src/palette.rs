use std::collections::HashMap;

/// A fixed set of visually distinct series colors. Slot assignment is
/// deterministic: the same index always yields the same color, so identical
/// data re-renders identically.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// The standard six-color palette used by every chart type.
    pub fn standard() -> Self {
        Self {
            colors: [
                "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a zero-based series or item index, wrapping around the
    /// palette.
    pub fn slot(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    /// Assign a color to each key by its position in the slice.
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), self.slot(i).to_string()))
            .collect()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::standard()
    }
}
