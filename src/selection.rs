use crate::classify::{classify_columns, ColumnProfile};
use crate::data::Dataset;

/// Whether a grouped line chart shows every group as its own series or is
/// restricted to a single group value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GroupMode {
    #[default]
    All,
    Single(String),
}

/// The column bindings a chart renders with. Initialized from inferred
/// defaults on dataset load, then mutated only by explicit user choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Category/label column for bar and pie.
    pub label_col: Option<String>,
    /// Measure column for bar and pie.
    pub value_col: Option<String>,
    /// X axis column for line.
    pub x_col: Option<String>,
    /// Measure column for line.
    pub y_col: Option<String>,
    /// Optional grouping key column.
    pub group_col: Option<String>,
    pub group_mode: GroupMode,
}

impl Selection {
    /// Derive default bindings from column profiles:
    /// label = first categorical column, x = first sequential (falling back
    /// to categorical), measure = first numeric (falling back to the second
    /// column), group = first geographic key if one exists.
    pub fn defaults_for(profiles: &[ColumnProfile]) -> Self {
        let first = profiles.first().map(|p| p.name.clone());
        let second = profiles.get(1).map(|p| p.name.clone());

        let label_col = profiles
            .iter()
            .find(|p| p.roles.categorical)
            .map(|p| p.name.clone())
            .or_else(|| first.clone());

        let x_col = profiles
            .iter()
            .find(|p| p.roles.sequential)
            .map(|p| p.name.clone())
            .or_else(|| label_col.clone());

        let measure = profiles
            .iter()
            .find(|p| p.roles.numeric)
            .map(|p| p.name.clone())
            .or(second)
            .or(first);

        let group_col = profiles
            .iter()
            .find(|p| p.roles.geographic)
            .map(|p| p.name.clone());

        Self {
            label_col,
            value_col: measure.clone(),
            x_col,
            y_col: measure,
            group_col,
            group_mode: GroupMode::All,
        }
    }
}

/// Owns the loaded dataset together with everything derived from it.
/// Loading a new dataset replaces all three fields wholesale; no selection
/// state survives a reload.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub dataset: Dataset,
    pub profiles: Vec<ColumnProfile>,
    pub selection: Selection,
}

impl Workspace {
    pub fn new(dataset: Dataset) -> Self {
        let mut workspace = Self::default();
        workspace.load(dataset);
        workspace
    }

    /// Replace the dataset, reclassify its columns, and reset the selection
    /// to fresh defaults.
    pub fn load(&mut self, dataset: Dataset) {
        self.profiles = classify_columns(&dataset);
        self.selection = Selection::defaults_for(&self.profiles);
        self.dataset = dataset;
    }
}
