//! Budget-bounded pagination of rendered rows.
//!
//! The paginator assembles pages by re-rendering the layout with one more
//! row and measuring the result, rather than pre-computing byte costs: the
//! layout's own markup can vary with page number and row count, so the only
//! reliable measure of a candidate page is rendering it. The naive form is
//! O(n²) in rows per batch; batches are small enough in practice that the
//! exactness is worth it.

use crate::error::Result;
use crate::template::{LayoutView, TemplateRegistry};
use crate::types::{AlertBatch, Page, RenderedRow};

/// Default maximum rendered size of one page, in bytes.
pub const DEFAULT_BYTE_BUDGET: usize = 4000;

/// Assembles rendered rows into budget-bounded pages.
///
/// Pure over its inputs: the same rows, layout, and budget always produce
/// the same page list.
pub struct Paginator<'a> {
    registry: &'a TemplateRegistry,
    layout: &'a str,
    budget: usize,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator for one render pass.
    #[must_use]
    pub fn new(registry: &'a TemplateRegistry, layout: &'a str, budget: usize) -> Self {
        Self {
            registry,
            layout,
            budget,
        }
    }

    /// Splits `rows` into pages whose fully rendered layout stays within the
    /// byte budget.
    ///
    /// A page always holds at least one row: a single row that exceeds the
    /// budget on its own still gets a page of its own, never dropped or
    /// truncated. An empty row list yields no pages.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecution` if the layout fails to
    /// render; no partial page list is returned.
    pub fn paginate(&self, batch: &AlertBatch, rows: &[RenderedRow]) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        if rows.is_empty() {
            return Ok(pages);
        }

        let mut start = 0;
        let mut current = String::new();
        let mut i = 0;
        while i < rows.len() {
            let view = LayoutView::new(batch, pages.len(), &rows[start..=i]);
            let candidate = self.registry.render_layout(self.layout, &view)?;

            // The first row of a page is accepted regardless of size; that
            // guarantees forward progress for the oversized-row edge case.
            if candidate.len() <= self.budget || i == start {
                current = candidate;
                i += 1;
            } else {
                pages.push(Page::new(pages.len(), std::mem::take(&mut current), start..i));
                start = i;
            }
        }
        pages.push(Page::new(pages.len(), current, start..rows.len()));

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatOptions;
    use proptest::prelude::*;

    /// Registry with a passthrough layout whose overhead is a fixed banner.
    fn plain_registry() -> TemplateRegistry {
        let mut registry = TemplateRegistry::new(&FormatOptions::default()).unwrap();
        registry
            .register_layout("plain", "{{#each rows}}{{{this}}}{{/each}}")
            .unwrap();
        registry
            .register_layout(
                "banner",
                "== {{status}} ==\n{{#each rows}}{{{this}}}{{/each}}",
            )
            .unwrap();
        registry
    }

    fn rows_of(sizes: &[usize]) -> Vec<RenderedRow> {
        sizes
            .iter()
            .map(|&n| RenderedRow::new("x".repeat(n), None))
            .collect()
    }

    fn firing_batch() -> AlertBatch {
        AlertBatch {
            status: "firing".to_string(),
            ..AlertBatch::default()
        }
    }

    #[test]
    fn empty_rows_yield_no_pages() {
        let registry = plain_registry();
        let paginator = Paginator::new(&registry, "plain", 100);
        let pages = paginator.paginate(&firing_batch(), &[]).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn all_rows_fit_on_one_page() {
        let registry = plain_registry();
        let paginator = Paginator::new(&registry, "plain", 100);
        let pages = paginator
            .paginate(&firing_batch(), &rows_of(&[20, 20, 20]))
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rows, 0..3);
        assert_eq!(pages[0].byte_len(), 60);
    }

    #[test]
    fn overflow_starts_a_new_page() {
        let registry = plain_registry();
        let paginator = Paginator::new(&registry, "plain", 50);
        let pages = paginator
            .paginate(&firing_batch(), &rows_of(&[30, 30, 30]))
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].rows, 0..1);
        assert_eq!(pages[1].rows, 1..2);
        assert_eq!(pages[2].rows, 2..3);
    }

    #[test]
    fn oversized_single_row_gets_its_own_page_unsplit() {
        let registry = plain_registry();
        let paginator = Paginator::new(&registry, "plain", 100);
        let pages = paginator
            .paginate(&firing_batch(), &rows_of(&[40, 250, 40]))
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].rows, 1..2);
        assert_eq!(pages[1].byte_len(), 250);
        assert!(pages[0].byte_len() <= 100);
        assert!(pages[2].byte_len() <= 100);
    }

    #[test]
    fn layout_overhead_counts_against_the_budget() {
        let registry = plain_registry();
        // Banner is "== firing ==\n": 13 bytes of overhead per page.
        let paginator = Paginator::new(&registry, "banner", 40);
        let pages = paginator
            .paginate(&firing_batch(), &rows_of(&[20, 20]))
            .unwrap();

        // 13 + 20 + 20 = 53 > 40, so the rows split across two pages.
        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert!(page.content.starts_with("== firing ==\n"));
            assert!(page.byte_len() <= 40);
        }
    }

    #[test]
    fn boundary_exact_fit_stays_on_page() {
        let registry = plain_registry();
        let paginator = Paginator::new(&registry, "plain", 60);
        let pages = paginator
            .paginate(&firing_batch(), &rows_of(&[30, 30]))
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].byte_len(), 60);
    }

    proptest! {
        #[test]
        fn pages_partition_rows_and_respect_budget(
            sizes in prop::collection::vec(1usize..200, 1..60),
            budget in 50usize..400,
        ) {
            let registry = plain_registry();
            let rows = rows_of(&sizes);
            let paginator = Paginator::new(&registry, "banner", budget);
            let batch = firing_batch();
            let pages = paginator.paginate(&batch, &rows).unwrap();

            // Indices contiguous from 0.
            for (i, page) in pages.iter().enumerate() {
                prop_assert_eq!(page.index, i);
            }

            // Row ranges reconstruct the full sequence with no gaps.
            let mut next = 0;
            for page in &pages {
                prop_assert_eq!(page.rows.start, next);
                prop_assert!(page.rows.end > page.rows.start);
                next = page.rows.end;
            }
            prop_assert_eq!(next, rows.len());

            // Budget holds except for the single-row degenerate case.
            for page in &pages {
                prop_assert!(page.byte_len() <= budget || page.row_count() == 1);
            }

            // Determinism.
            let again = paginator.paginate(&batch, &rows).unwrap();
            prop_assert_eq!(pages, again);
        }
    }
}
