//! Selection and highlight state per list
//!
//! Each list (installed, catalog) tracks the last interacted index, the
//! committed selection and the transient highlight. Highlight never
//! implies selection; the two sets may overlap.

use std::collections::BTreeSet;

/// Which list the user is looking at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Installed,
    Browse,
}

/// A click on a list row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub index: usize,
    pub shift: bool,
    pub click_count: u32,
}

impl Interaction {
    pub fn click(index: usize) -> Self {
        Self {
            index,
            shift: false,
            click_count: 1,
        }
    }

    pub fn double_click(index: usize) -> Self {
        Self {
            index,
            shift: false,
            click_count: 2,
        }
    }

    pub fn shift_click(index: usize) -> Self {
        Self {
            index,
            shift: true,
            click_count: 1,
        }
    }
}

/// Effect of a row interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome<K> {
    /// Ids in the range were added to the highlight
    Highlighted(Vec<K>),
    /// Single id toggled in the selection
    Toggled { id: K, selected: bool },
    /// Plain activation: open the detail panel for this id
    Inspect(K),
    /// Index out of range
    Ignored,
}

/// Effect of a checkbox click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckboxOutcome<K> {
    Highlighted(Vec<K>),
    Selected(Vec<K>),
    Deselected(Vec<K>),
    Ignored,
}

/// Effect of the detail panel's select button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelToggle<K> {
    Selected(Vec<K>),
    Deselected(Vec<K>),
    /// The whole selection was dropped
    Cleared(Vec<K>),
}

/// Caption of the detail panel's select button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelToggleLabel {
    SelectGroup(usize),
    UnselectGroup(usize),
    SelectOne,
    UnselectOne,
    UnselectAll(usize),
}

impl PanelToggleLabel {
    /// Button text; `suffix` goes after the select captions, e.g.
    /// " for download" in the catalog list
    pub fn text(&self, suffix: &str) -> String {
        match self {
            PanelToggleLabel::SelectGroup(count) => format!("Select {} mods{}", count, suffix),
            PanelToggleLabel::UnselectGroup(count) => format!("Unselect {} mods", count),
            PanelToggleLabel::SelectOne => format!("Select mod{}", suffix),
            PanelToggleLabel::UnselectOne => "Unselect mod".to_string(),
            PanelToggleLabel::UnselectAll(count) => format!("Unselect all ({})", count),
        }
    }
}

/// Selection and highlight of one list
#[derive(Debug, Clone)]
pub struct ListSelection<K: Ord + Clone> {
    last_index: Option<usize>,
    selected: BTreeSet<K>,
    highlighted: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for ListSelection<K> {
    fn default() -> Self {
        Self {
            last_index: None,
            selected: BTreeSet::new(),
            highlighted: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> ListSelection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row interaction over the displayed `ids`.
    ///
    /// Precedence: shift with a previous index highlights the range;
    /// a double click toggles selection; a plain click clears the
    /// highlight and asks for inspection.
    pub fn interact(&mut self, ids: &[K], interaction: Interaction) -> RowOutcome<K> {
        let index = interaction.index;
        let Some(id) = ids.get(index).cloned() else {
            return RowOutcome::Ignored;
        };

        if interaction.shift {
            if let Some(prev) = self.last_index {
                let added = self.highlight_range(ids, prev, index);
                self.last_index = Some(index);
                return RowOutcome::Highlighted(added);
            }
        }

        self.last_index = Some(index);
        if interaction.click_count >= 2 {
            let selected = self.toggle(&id);
            self.highlighted.remove(&id);
            RowOutcome::Toggled { id, selected }
        } else {
            self.highlighted.clear();
            RowOutcome::Inspect(id)
        }
    }

    /// Checkbox click; never opens the detail panel.
    ///
    /// With a non-empty highlight, the clicked id and every highlighted id
    /// flip together: all inserted if the clicked id was unselected, all
    /// removed otherwise. The highlight itself is kept.
    pub fn checkbox(&mut self, ids: &[K], index: usize, shift: bool) -> CheckboxOutcome<K> {
        let Some(id) = ids.get(index).cloned() else {
            return CheckboxOutcome::Ignored;
        };

        if shift {
            if let Some(prev) = self.last_index {
                let added = self.highlight_range(ids, prev, index);
                self.last_index = Some(index);
                return CheckboxOutcome::Highlighted(added);
            }
        }

        self.last_index = Some(index);
        let adding = !self.selected.contains(&id);
        let group = self.group_with(id);

        if adding {
            self.selected.extend(group.iter().cloned());
            CheckboxOutcome::Selected(group)
        } else {
            for member in &group {
                self.selected.remove(member);
            }
            CheckboxOutcome::Deselected(group)
        }
    }

    /// Select button of the detail panel for the inspected `id`.
    ///
    /// With a highlight, the id and every highlighted id are removed only
    /// when all of them are already selected, otherwise all are added.
    /// Without a highlight, a selected id clears the whole selection and an
    /// unselected one is added alone.
    pub fn panel_toggle(&mut self, id: &K) -> PanelToggle<K> {
        if !self.highlighted.is_empty() {
            let group = self.group_with(id.clone());
            if self.group_fully_selected(id) {
                for member in &group {
                    self.selected.remove(member);
                }
                PanelToggle::Deselected(group)
            } else {
                self.selected.extend(group.iter().cloned());
                PanelToggle::Selected(group)
            }
        } else if self.selected.contains(id) {
            let cleared = std::mem::take(&mut self.selected);
            PanelToggle::Cleared(cleared.into_iter().collect())
        } else {
            self.selected.insert(id.clone());
            PanelToggle::Selected(vec![id.clone()])
        }
    }

    /// Caption matching what `panel_toggle` would do for `id`
    pub fn panel_label(&self, id: &K) -> PanelToggleLabel {
        if !self.highlighted.is_empty() {
            let count = self.highlighted.len() + usize::from(!self.highlighted.contains(id));
            if self.group_fully_selected(id) {
                PanelToggleLabel::UnselectGroup(count)
            } else {
                PanelToggleLabel::SelectGroup(count)
            }
        } else if self.selected.contains(id) {
            if self.selected.len() > 1 {
                PanelToggleLabel::UnselectAll(self.selected.len())
            } else {
                PanelToggleLabel::UnselectOne
            }
        } else {
            PanelToggleLabel::SelectOne
        }
    }

    fn group_fully_selected(&self, id: &K) -> bool {
        self.selected.contains(id) && self.highlighted.iter().all(|h| self.selected.contains(h))
    }

    /// `id` followed by the other highlighted ids
    fn group_with(&self, id: K) -> Vec<K> {
        let others: Vec<K> = self
            .highlighted
            .iter()
            .filter(|h| **h != id)
            .cloned()
            .collect();
        let mut group = vec![id];
        group.extend(others);
        group
    }

    fn highlight_range(&mut self, ids: &[K], a: usize, b: usize) -> Vec<K> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let range: Vec<K> = ids
            .iter()
            .skip(start)
            .take(end - start + 1)
            .cloned()
            .collect();
        self.highlighted.extend(range.iter().cloned());
        range
    }

    fn toggle(&mut self, id: &K) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Forget the highlight and range anchor, keep the selection
    pub fn reset_interaction(&mut self) {
        self.highlighted.clear();
        self.last_index = None;
    }

    /// Drop everything, e.g. after a committed batch
    pub fn clear(&mut self) {
        self.selected.clear();
        self.reset_interaction();
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn selected(&self) -> &BTreeSet<K> {
        &self.selected
    }

    pub fn highlighted(&self) -> &BTreeSet<K> {
        &self.highlighted
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    pub fn is_highlighted(&self, id: &K) -> bool {
        self.highlighted.contains(id)
    }

    /// Selected or highlighted ids
    pub fn marked(&self) -> BTreeSet<K> {
        self.selected.union(&self.highlighted).cloned().collect()
    }

    /// `wanted` in display order, then the rest in id order
    pub fn ordered(&self, displayed: &[K], wanted: &BTreeSet<K>) -> Vec<K> {
        let mut ordered: Vec<K> = displayed
            .iter()
            .filter(|id| wanted.contains(*id))
            .cloned()
            .collect();
        let shown: BTreeSet<&K> = displayed.iter().collect();
        ordered.extend(wanted.iter().filter(|id| !shown.contains(id)).cloned());
        ordered
    }
}

/// Selection state of both lists; selections never cross lists
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    pub installed: ListSelection<String>,
    pub catalog: ListSelection<i64>,
}

impl SelectionModel {
    /// Tab switch: clear the target tab's highlight and anchor
    pub fn enter_tab(&mut self, tab: Tab) {
        match tab {
            Tab::Installed => self.installed.reset_interaction(),
            Tab::Browse => self.catalog.reset_interaction(),
        }
    }

    pub fn clear_all(&mut self) {
        self.installed.clear();
        self.catalog.clear();
    }
}
