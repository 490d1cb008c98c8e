use serde::{Deserialize, Serialize};

/// Inputs for one pager render. `current_page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerState {
    pub current_page: u32,
    pub total_results: u32,
    pub results_per_page: u32,
    pub pagination_range: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    /// Start rank to request for this page; `None` when there is no such page.
    pub offset: Option<u32>,
    pub disabled: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
    pub current_page: u32,
    pub total_pages: u32,
    pub previous: PageLink,
    pub next: PageLink,
    pub pages: Vec<PageLink>,
}

/// First start rank of `page`: `(page - 1) * per_page + 1`.
pub fn page_to_offset(page: u32, results_per_page: u32) -> u32 {
    page.max(1)
        .saturating_sub(1)
        .saturating_mul(results_per_page.max(1))
        .saturating_add(1)
}

/// Page containing the 1-based start rank `offset`.
pub fn offset_to_page(offset: u32, results_per_page: u32) -> u32 {
    offset.max(1).saturating_sub(1) / results_per_page.max(1) + 1
}

pub fn total_pages(total_results: u32, results_per_page: u32) -> u32 {
    total_results.div_ceil(results_per_page.max(1))
}

impl PagerState {
    pub fn view(&self) -> PagerView {
        let per_page = self.results_per_page.max(1);
        let total = total_pages(self.total_results, per_page);
        let current = self.current_page.max(1);

        let link = |page: u32, enabled: bool| PageLink {
            page,
            offset: enabled.then(|| page_to_offset(page, per_page)),
            disabled: !enabled,
            current: false,
        };
        let previous = link(current.saturating_sub(1), current > 1);
        let next = link(current.saturating_add(1), current < total);

        let pages = if total == 0 {
            Vec::new()
        } else {
            let width = self.pagination_range.clamp(1, total);
            let mut start = current.saturating_sub(width / 2).max(1);
            let end = start.saturating_add(width - 1).min(total);
            start = end.saturating_sub(width - 1).max(1);
            (start..=end)
                .map(|page| PageLink {
                    page,
                    offset: Some(page_to_offset(page, per_page)),
                    disabled: page == current,
                    current: page == current,
                })
                .collect()
        };

        PagerView {
            current_page: current,
            total_pages: total,
            previous,
            next,
            pages,
        }
    }
}

/// Pager markup. Each enabled button carries its fetch offset in `data-offset`.
pub fn render_pager(state: &PagerState) -> String {
    let view = state.view();
    let mut out = String::from(r#"<nav class="pagination" aria-label="Pagination">"#);
    out.push_str(&nav_button("pagination__prev", "Previous", &view.previous));
    out.push_str(r#"<ul class="pagination__pages">"#);
    for page in &view.pages {
        let current = if page.current {
            r#" aria-current="page""#
        } else {
            ""
        };
        out.push_str(&format!(
            r#"<li><button type="button" class="pagination__page" data-page="{}"{}{}{}>{}</button></li>"#,
            page.page,
            offset_attr(page),
            current,
            disabled_attr(page),
            page.page
        ));
    }
    out.push_str("</ul>");
    out.push_str(&nav_button("pagination__next", "Next", &view.next));
    out.push_str("</nav>");
    out
}

fn nav_button(class: &str, label: &str, link: &PageLink) -> String {
    format!(
        r#"<button type="button" class="{class}" aria-label="{label} page"{}{}>{label}</button>"#,
        offset_attr(link),
        disabled_attr(link)
    )
}

fn offset_attr(link: &PageLink) -> String {
    link.offset
        .map(|o| format!(r#" data-offset="{o}""#))
        .unwrap_or_default()
}

fn disabled_attr(link: &PageLink) -> &'static str {
    if link.disabled { " disabled" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(
        current_page: u32,
        total_results: u32,
        results_per_page: u32,
        pagination_range: u32,
    ) -> PagerState {
        PagerState {
            current_page,
            total_results,
            results_per_page,
            pagination_range,
        }
    }

    #[test]
    fn page_and_offset_map_both_ways() {
        assert_eq!(page_to_offset(1, 10), 1);
        assert_eq!(page_to_offset(2, 10), 11);
        assert_eq!(page_to_offset(5, 12), 49);
        assert_eq!(offset_to_page(1, 10), 1);
        assert_eq!(offset_to_page(11, 10), 2);
        assert_eq!(offset_to_page(20, 10), 2);
        assert_eq!(offset_to_page(21, 10), 3);
        for page in 1..50 {
            assert_eq!(offset_to_page(page_to_offset(page, 7), 7), page);
        }
    }

    #[test]
    fn first_page_of_hundred() {
        let view = state(1, 100, 10, 5).view();
        assert_eq!(view.total_pages, 10);
        assert!(view.previous.disabled);
        assert!(!view.next.disabled);
        assert_eq!(view.next.offset, Some(11));
        let first = view.pages[0];
        assert!(first.current && first.disabled);
        assert_eq!(view.pages[1].page, 2);
        assert_eq!(view.pages[1].offset, Some(11));

        let html = render_pager(&state(1, 100, 10, 5));
        assert!(html.contains(
            r#"data-page="1" data-offset="1" aria-current="page" disabled>1<"#
        ));
        assert!(html.contains(r#"data-page="2" data-offset="11">2<"#));
    }

    #[test]
    fn window_slides_and_clips() {
        let pages = |s: PagerState| s.view().pages.iter().map(|p| p.page).collect::<Vec<_>>();
        assert_eq!(pages(state(1, 100, 10, 5)), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages(state(6, 100, 10, 5)), vec![4, 5, 6, 7, 8]);
        assert_eq!(pages(state(10, 100, 10, 5)), vec![6, 7, 8, 9, 10]);
        assert_eq!(pages(state(2, 25, 10, 5)), vec![1, 2, 3]);
        assert_eq!(pages(state(3, 100, 10, 4)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn bounds_hold_across_inputs() {
        for total_results in [0u32, 1, 9, 10, 11, 99, 100, 101, 1000] {
            for per_page in [1u32, 3, 10, 25] {
                let total = total_pages(total_results, per_page);
                for range in [1u32, 2, 5, 8] {
                    for current in 1..=total.max(1) {
                        let view = state(current, total_results, per_page, range).view();
                        for p in &view.pages {
                            assert!(p.page >= 1 && p.page <= total, "page {} of {total}", p.page);
                        }
                        assert_eq!(view.previous.disabled, current == 1);
                        assert_eq!(view.next.disabled, total == 0 || current == total);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_results_disable_everything() {
        let view = state(1, 0, 10, 5).view();
        assert_eq!(view.total_pages, 0);
        assert!(view.pages.is_empty());
        assert!(view.previous.disabled && view.next.disabled);
        let html = render_pager(&state(1, 0, 10, 5));
        assert!(!html.contains("data-offset"));
    }
}
