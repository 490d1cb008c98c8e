use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::client::SearchClient;
use crate::config::ListingSettings;
use crate::dom::{PagerControl, Region, SectionDom};
use crate::error::{ListingError, ListingResult};
use crate::mapping::normalize;
use crate::modal::{ModalRegistry, ModalState};
use crate::pager::{offset_to_page, render_pager, total_pages, PagerState};
use crate::render::{render_card, render_modals};
use crate::types::{ListingConfig, RawResult, ResultsSummary, SearchResponse};

const NETWORK_NOTICE: &str = "We couldn't load more results. Please try again.";

/// Result of one pagination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered(PageSummary),
    /// A newer request started before this one finished; its results were dropped.
    Superseded { generation: u64 },
    /// Disabled, offset-less or orphaned control.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub generation: u64,
    pub offset: u32,
    pub page: u32,
    pub total_pages: u32,
    pub cards: usize,
    pub modals: usize,
}

/// Markup for the three regions of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub cards: String,
    pub pager: String,
    pub modals: String,
    pub card_count: usize,
    pub modal_count: usize,
    pub pager_state: PagerState,
}

/// Render results into the card list, pager and modal markup for the page starting at `offset`.
pub fn render_page(
    display: &str,
    results: &[RawResult],
    summary: ResultsSummary,
    offset: u32,
    settings: &ListingSettings,
) -> RenderedPage {
    let mut cards = Vec::with_capacity(results.len());
    let mut descriptors = Vec::new();
    for raw in results {
        let rendered = render_card(&normalize(raw), display);
        cards.push(rendered.html);
        descriptors.extend(rendered.modal);
    }

    let per_page = if summary.num_ranks > 0 {
        summary.num_ranks
    } else {
        settings.results_per_page
    };
    let pager_state = PagerState {
        current_page: offset_to_page(offset, per_page),
        total_results: summary.total_matching,
        results_per_page: per_page,
        pagination_range: settings.pagination_range,
    };

    RenderedPage {
        card_count: cards.len(),
        modal_count: descriptors.len(),
        cards: cards.join("\n"),
        pager: render_pager(&pager_state),
        modals: render_modals(&descriptors, &settings.player_base_url),
        pager_state,
    }
}

struct SectionState<D> {
    dom: D,
    modals: ModalRegistry,
    controls: Vec<PagerControl>,
    openers: Vec<String>,
}

impl<D: SectionDom> SectionState<D> {
    /// Replaced markup carries no handlers; pick up the new controls and forget the open dialog.
    fn rebind(&mut self) {
        self.modals.reset();
        self.controls = self.dom.pager_controls();
        self.openers = self.dom.modal_openers();
    }
}

/// One listing section: its configuration, its document regions and the search client behind it.
pub struct ListingSection<C, D> {
    config: ListingConfig,
    settings: ListingSettings,
    client: C,
    state: Mutex<SectionState<D>>,
    generation: AtomicU64,
}

impl<C: SearchClient, D: SectionDom> ListingSection<C, D> {
    /// Read the section's configuration and bind to its server-rendered controls.
    pub fn mount(client: C, dom: D, settings: ListingSettings) -> ListingResult<Self> {
        let config = match read_config(&dom) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "listing section not mounted");
                return Err(e);
            }
        };
        let mut state = SectionState {
            dom,
            modals: ModalRegistry::new(settings.modal_policy),
            controls: Vec::new(),
            openers: Vec::new(),
        };
        state.rebind();
        debug!(
            display = %config.display,
            controls = state.controls.len(),
            "listing section mounted"
        );
        Ok(Self {
            config,
            settings,
            client,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    pub fn settings(&self) -> &ListingSettings {
        &self.settings
    }

    /// Pager controls currently wired to this section.
    pub fn bound_controls(&self) -> Vec<PagerControl> {
        self.lock().controls.clone()
    }

    pub fn modal_state(&self) -> ModalState {
        self.lock().modals.state().clone()
    }

    pub fn with_dom<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.lock().dom)
    }

    pub fn into_dom(self) -> D {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        state.dom
    }

    /// Handle a click on a pager control.
    pub async fn paginate(&self, control: &PagerControl) -> ListingResult<PageOutcome> {
        if control.disabled {
            debug!(label = %control.label, "ignoring disabled pager control");
            return Ok(PageOutcome::Ignored);
        }
        let Some(offset) = control.offset else {
            debug!(label = %control.label, "pager control has no offset");
            return Ok(PageOutcome::Ignored);
        };
        let bound = self.lock().controls.contains(control);
        if !bound {
            debug!(label = %control.label, "pager control is no longer bound");
            return Ok(PageOutcome::Ignored);
        }
        self.load_page(offset).await
    }

    /// Fetch the page starting at `offset` and swap it into the section.
    ///
    /// On failure the current page stays in place. Results of a request that was
    /// overtaken by a newer one are dropped.
    pub async fn load_page(&self, offset: u32) -> ListingResult<PageOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.config.request_url(offset);
        debug!(%url, offset, generation, "fetching listing page");

        let body = match self.client.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, offset, generation, "listing fetch failed");
                self.notify_if_current(generation);
                return Err(e);
            }
        };
        let response: SearchResponse = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, offset, generation, "listing response is not JSON");
                self.notify_if_current(generation);
                return Err(ListingError::Decode(e));
            }
        };
        let Some(summary) = response.summary() else {
            warn!(
                offset,
                generation,
                "listing response has no results summary; keeping current page"
            );
            return Err(ListingError::MissingSummary);
        };

        let page = render_page(
            &self.config.display,
            response.results(),
            summary,
            offset,
            &self.settings,
        );

        let mut state = self.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            debug!(generation, latest, "dropping superseded listing response");
            return Ok(PageOutcome::Superseded { generation });
        }
        state.dom.replace_region(Region::CardList, &page.cards);
        state.dom.replace_region(Region::Pager, &page.pager);
        state.dom.replace_region(Region::Modals, &page.modals);
        state.dom.show_notice(None);
        state.dom.scroll_to_top();
        state.rebind();

        let pager = page.pager_state;
        let summary = PageSummary {
            generation,
            offset,
            page: pager.current_page,
            total_pages: total_pages(pager.total_results, pager.results_per_page),
            cards: page.card_count,
            modals: page.modal_count,
        };
        info!(
            offset,
            page = summary.page,
            total_pages = summary.total_pages,
            cards = summary.cards,
            "listing page rendered"
        );
        Ok(PageOutcome::Rendered(summary))
    }

    /// Open the dialog behind a card's play button.
    pub fn open_modal(&self, id: &str) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.openers.iter().any(|o| o == id) {
            debug!(modal_id = id, "no bound opener for modal");
            return false;
        }
        state.modals.open(&mut state.dom, id)
    }

    pub fn close_modal(&self) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.modals.close(&mut state.dom)
    }

    /// Section-wide keydown hook.
    pub fn handle_key(&self, key: &str) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.modals.handle_key(&mut state.dom, key)
    }

    fn notify_if_current(&self, generation: u64) {
        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) == generation {
            state.dom.show_notice(Some(NETWORK_NOTICE));
        }
    }

    fn lock(&self) -> MutexGuard<'_, SectionState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_config<D: SectionDom>(dom: &D) -> ListingResult<ListingConfig> {
    let missing: Vec<&str> = Region::ALL
        .iter()
        .filter(|r| !dom.has_region(**r))
        .map(|r| r.name())
        .collect();
    if !missing.is_empty() {
        let message = format!("missing {} container", missing.join(", "));
        return Err(ListingError::Configuration(message));
    }
    let attribute = |name: &str| {
        let message = || format!("missing data-{name} attribute");
        dom.data_attribute(name)
            .ok_or_else(|| ListingError::Configuration(message()))
    };
    Ok(ListingConfig {
        query: attribute("query")?,
        endpoint: attribute("endpoint")?,
        display: dom.data_attribute("display").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn render_page_counts_cards_and_modals() {
        let results = vec![
            RawResult {
                title: Some("Story".into()),
                ..Default::default()
            },
            RawResult {
                title: Some("Clip".into()),
                kind: Some("Video".into()),
                video_url: Some("v1".into()),
                ..Default::default()
            },
        ];
        let summary = ResultsSummary {
            total_matching: 42,
            num_ranks: 10,
        };
        let page = render_page("", &results, summary, 21, &ListingSettings::default());
        assert_eq!(page.card_count, 2);
        assert_eq!(page.modal_count, 1);
        assert_eq!(page.pager_state.current_page, 3);
        assert!(page.modals.contains("embed/v1?autoplay=0"));
    }

    #[test]
    fn zero_num_ranks_falls_back_to_configured_page_size() {
        let settings = ListingSettings {
            results_per_page: 12,
            ..Default::default()
        };
        let summary = ResultsSummary {
            total_matching: 30,
            num_ranks: 0,
        };
        let page = render_page("", &[], summary, 13, &settings);
        assert_eq!(page.pager_state.results_per_page, 12);
        assert_eq!(page.pager_state.current_page, 2);
    }

    #[test]
    fn read_config_requires_regions_and_attributes() {
        let dom = MemoryDom::section()
            .with_attribute("endpoint", "https://s/")
            .with_attribute("query", "?q=1");
        let cfg = read_config(&dom).unwrap();
        assert_eq!(cfg.display, "");

        let no_query = MemoryDom::section().with_attribute("endpoint", "https://s/");
        assert!(matches!(
            read_config(&no_query),
            Err(ListingError::Configuration(_))
        ));

        let no_pager = dom.without_region(Region::Pager);
        match read_config(&no_pager) {
            Err(ListingError::Configuration(msg)) => assert!(msg.contains("pager")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
