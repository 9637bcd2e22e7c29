//! Educational content shown on the content tab

/// One catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentItem {
    /// Card title
    pub title: &'static str,
    /// One-line summary
    pub description: &'static str,
}

/// Fixed catalogue, in display order
pub const CATALOGUE: [ContentItem; 4] = [
    ContentItem {
        title: "Understand your cycle",
        description: "Everything about the phases of the menstrual cycle",
    },
    ContentItem {
        title: "Fertility",
        description: "Fertile days and ovulation",
    },
    ContentItem {
        title: "Common symptoms",
        description: "How to deal with PMS and cramps",
    },
    ContentItem {
        title: "Intimate health",
        description: "Essential care",
    },
];

/// The content catalogue
pub fn catalogue() -> &'static [ContentItem] {
    &CATALOGUE
}
