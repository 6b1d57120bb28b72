//! Search and drill-down over a loaded label catalog.
//!
//! # Design
//! - Filtering is a pure function of `(catalog, query)`; the picker only caches its result.
//! - Grouped catalogs drill down one level: category list, then a category's items.
//! - Only values visible in the current filtered result can be chosen.

use rebuddy_models::{Catalog, LabelCategory, LabelItem};

/// Filter `catalog` by a case-insensitive substring match on display names.
///
/// A blank query returns the catalog unchanged. Grouped catalogs drop categories
/// left without matches. Order is preserved.
#[must_use]
pub fn filter_catalog(catalog: &Catalog, query: &str) -> Catalog {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.clone();
    }
    let matches = |item: &&LabelItem| item.display_name.to_lowercase().contains(&needle);

    match catalog {
        Catalog::Flat(items) => Catalog::Flat(items.iter().filter(matches).cloned().collect()),
        Catalog::Grouped(categories) => Catalog::Grouped(
            categories
                .iter()
                .filter_map(|category| {
                    let items: Vec<LabelItem> =
                        category.items.iter().filter(matches).cloned().collect();
                    (!items.is_empty()).then(|| LabelCategory {
                        category: category.category.clone(),
                        items,
                    })
                })
                .collect(),
        ),
    }
}

/// Empty-state message for a query with no matches.
#[must_use]
pub fn empty_message(query: &str) -> String {
    format!("No items match \"{query}\"")
}

/// Live announcement for `count` matches.
#[must_use]
pub fn count_announcement(count: usize) -> String {
    if count == 1 {
        "1 item found".to_string()
    } else {
        format!("{count} items found")
    }
}

/// Category heading with its visible item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    /// Category heading.
    pub name: String,
    /// Items visible under the current query.
    pub item_count: usize,
}

/// What the picker currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView {
    /// Selectable items, under a category heading when drilled down.
    Items {
        /// Open category, if any.
        heading: Option<String>,
        /// Items in display order.
        items: Vec<LabelItem>,
    },
    /// Category list of a grouped catalog.
    Categories(Vec<CategorySummary>),
    /// Nothing matches the query.
    Empty {
        /// User-facing message naming the query.
        message: String,
    },
}

/// Search state over a catalog.
#[derive(Debug, Clone)]
pub struct ItemPicker {
    catalog: Catalog,
    query: String,
    filtered: Catalog,
    open_category: Option<String>,
    announcement: Option<String>,
}

impl ItemPicker {
    /// Picker over `catalog` with an empty query.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            filtered: catalog.clone(),
            catalog,
            query: String::new(),
            open_category: None,
            announcement: None,
        }
    }

    /// Current raw query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filtered catalog for the current query.
    #[must_use]
    pub const fn filtered(&self) -> &Catalog {
        &self.filtered
    }

    /// Current live announcement, present while a query is active.
    #[must_use]
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Replace the query. Returns the announcement when its text or the matching items changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<&str> {
        self.query = query.into();
        let filtered = filter_catalog(&self.catalog, &self.query);
        let matches_changed = filtered != self.filtered;
        self.filtered = filtered;

        if let Some(name) = &self.open_category
            && !self.category_visible(name)
        {
            self.open_category = None;
        }

        let next = (!self.query.trim().is_empty())
            .then(|| count_announcement(self.filtered.item_count()));
        if next == self.announcement && !matches_changed {
            return None;
        }
        self.announcement = next;
        self.announcement.as_deref()
    }

    /// Open category, if drilled down.
    #[must_use]
    pub fn open_category_name(&self) -> Option<&str> {
        self.open_category.as_deref()
    }

    /// Drill into a category. Returns `false` when it is not visible.
    pub fn open_category(&mut self, name: &str) -> bool {
        if !self.category_visible(name) {
            return false;
        }
        self.open_category = Some(name.to_string());
        true
    }

    /// Return to the category list, keeping the query.
    pub fn back(&mut self) {
        self.open_category = None;
    }

    /// Emit `value` if it is visible in the filtered result.
    #[must_use]
    pub fn choose(&self, value: &str) -> Option<String> {
        self.filtered.find(value).map(|item| item.value.clone())
    }

    /// Current presentation.
    #[must_use]
    pub fn view(&self) -> PickerView {
        if self.filtered.is_empty() {
            return PickerView::Empty {
                message: empty_message(&self.query),
            };
        }
        match &self.filtered {
            Catalog::Flat(items) => PickerView::Items {
                heading: None,
                items: items.clone(),
            },
            Catalog::Grouped(categories) => {
                let open = self.open_category.as_deref().and_then(|name| {
                    categories.iter().find(|category| category.category == name)
                });
                match open {
                    Some(category) => PickerView::Items {
                        heading: Some(category.category.clone()),
                        items: category.items.clone(),
                    },
                    None => PickerView::Categories(
                        categories
                            .iter()
                            .map(|category| CategorySummary {
                                name: category.category.clone(),
                                item_count: category.items.len(),
                            })
                            .collect(),
                    ),
                }
            }
        }
    }

    fn category_visible(&self, name: &str) -> bool {
        matches!(&self.filtered, Catalog::Grouped(categories)
            if categories.iter().any(|category| category.category == name))
    }
}
