use serde::Serialize;

/// One line of the rubric: what was checked and how many points it earned.
///
/// `awarded` starts at zero and only [`RubricItem::award_full`] raises it, so
/// `awarded <= possible` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricItem {
    label: String,
    awarded: u32,
    possible: u32,
    message: String,
}

impl RubricItem {
    pub fn new(label: impl Into<String>, possible: u32) -> Self {
        Self {
            label: label.into(),
            awarded: 0,
            possible,
            message: String::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn awarded(&self) -> u32 {
        self.awarded
    }

    pub fn possible(&self) -> u32 {
        self.possible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn award_full(&mut self) {
        self.awarded = self.possible;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

/// The ordered results of one grading run.
#[derive(Debug, Default, Clone)]
pub struct Rubric {
    items: Vec<RubricItem>,
}

impl Rubric {
    pub fn push(&mut self, item: RubricItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn possible(&self) -> u32 {
        self.items.iter().map(RubricItem::possible).sum()
    }

    pub fn awarded(&self) -> u32 {
        self.items.iter().map(RubricItem::awarded).sum()
    }
}

impl FromIterator<RubricItem> for Rubric {
    fn from_iter<I: IntoIterator<Item = RubricItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
