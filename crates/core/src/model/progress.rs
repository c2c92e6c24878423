/// Per-scale completion counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleProgress {
    name: String,
    success_count: u32,
    completed: bool,
}

impl ScaleProgress {
    /// A fresh entry for a scale that just entered the practice set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success_count: 0,
            completed: false,
        }
    }

    #[must_use]
    pub fn from_persisted(name: impl Into<String>, success_count: u32, completed: bool) -> Self {
        Self {
            name: name.into(),
            success_count,
            completed,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Count one successful repetition and latch completion.
    ///
    /// Returns true when this call moved the scale from incomplete to completed.
    pub(crate) fn record_success(&mut self, repetitions_required: u32) -> bool {
        let was_completed = self.completed;
        self.success_count = self.success_count.saturating_add(1);
        self.completed = self.success_count >= repetitions_required;
        !was_completed && self.completed
    }
}
