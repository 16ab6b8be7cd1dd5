/// Static wildlife catalog
///
/// The subjects users comment on. Each item's `id` is what an item scope
/// is keyed by, so ids must never change once shipped.

/// One animal in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    /// Stable identifier, e.g. "discover-1"
    pub id: &'static str,
    pub title: &'static str,
    /// Country the entry is associated with
    pub country: &'static str,
    pub description: &'static str,
}

const ITEMS: &[CatalogItem] = &[
    CatalogItem {
        id: "discover-1",
        title: "Sparrow",
        country: "China",
        description: "Sparrows, small and nimble, are ubiquitous avian companions in urban and \
                      rural landscapes alike. With their distinctive brown and gray plumage \
                      adorned by streaks of black and white, these chirpy creatures flit from \
                      branch to branch, their melodious songs a constant backdrop to daily life. \
                      Often seen in flocks, sparrows are social birds, forming tight-knit \
                      communities centered around food sources and sheltered nesting sites. \
                      Despite their diminutive size, sparrows exhibit remarkable resilience and \
                      adaptability, thriving in diverse environments ranging from bustling city \
                      streets to tranquil countryside meadows. Their presence serves as a \
                      reminder of nature's enduring resilience and its ability to coexist \
                      harmoniously with human civilization.",
    },
    CatalogItem {
        id: "discover-2",
        title: "Panda",
        country: "China",
        description: "",
    },
    CatalogItem {
        id: "discover-3",
        title: "Fox",
        country: "France",
        description: "",
    },
    CatalogItem {
        id: "discover-4",
        title: "Dog",
        country: "Germany",
        description: "",
    },
];

/// All catalog items in display order
pub fn catalog() -> &'static [CatalogItem] {
    ITEMS
}

/// Look up an item by id
pub fn find(id: &str) -> Option<&'static CatalogItem> {
    ITEMS.iter().find(|item| item.id == id)
}
