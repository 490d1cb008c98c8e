use std::collections::HashMap;

use html_escape::encode_double_quoted_attribute as attr;
use scraper::{Html, Selector};

/// The three containers a listing section owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    CardList,
    Pager,
    Modals,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::CardList, Region::Pager, Region::Modals];

    pub fn name(&self) -> &'static str {
        match self {
            Region::CardList => "card list",
            Region::Pager => "pager",
            Region::Modals => "modal wrapper",
        }
    }
}

/// A pagination button as found in the pager container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerControl {
    pub label: String,
    pub offset: Option<u32>,
    pub disabled: bool,
}

/// Observable state of one dialog element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalElement {
    pub id: String,
    pub hidden: bool,
    /// `src` of the embedded player iframe, if the dialog has one.
    pub player_src: Option<String>,
}

/// The slice of a document a listing section reads and writes.
pub trait SectionDom: Send {
    /// `data-*` attribute on the section root, without the `data-` prefix.
    fn data_attribute(&self, name: &str) -> Option<String>;
    fn has_region(&self, region: Region) -> bool;
    fn region_html(&self, region: Region) -> Option<String>;
    fn replace_region(&mut self, region: Region, html: &str);

    fn pager_controls(&self) -> Vec<PagerControl>;
    /// `data-modal-id` of every open-button in the card list.
    fn modal_openers(&self) -> Vec<String>;
    fn modal(&self, id: &str) -> Option<ModalElement>;
    /// Write back a dialog's state; false when no dialog has that id.
    fn set_modal(&mut self, element: ModalElement) -> bool;

    fn scroll_to_top(&mut self) {}
    /// Non-blocking inline status message; `None` clears it.
    fn show_notice(&mut self, _message: Option<&str>) {}
}

/// Document model kept in memory; markup written into a region is parsed for controls and dialogs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    attributes: HashMap<String, String>,
    regions: HashMap<Region, String>,
    modals: Vec<ModalElement>,
    notice: Option<String>,
    scrolls: usize,
}

impl MemoryDom {
    /// Section with all three containers present and empty.
    pub fn section() -> Self {
        let mut dom = Self::default();
        for region in Region::ALL {
            dom.regions.insert(region, String::new());
        }
        dom
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn without_region(mut self, region: Region) -> Self {
        self.regions.remove(&region);
        self
    }

    pub fn modals(&self) -> &[ModalElement] {
        &self.modals
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }
}

impl SectionDom for MemoryDom {
    fn data_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn has_region(&self, region: Region) -> bool {
        self.regions.contains_key(&region)
    }

    fn region_html(&self, region: Region) -> Option<String> {
        self.regions.get(&region).cloned()
    }

    fn replace_region(&mut self, region: Region, html: &str) {
        let Some(slot) = self.regions.get_mut(&region) else {
            return;
        };
        *slot = html.to_string();
        if region == Region::Modals {
            self.modals = parse_modals(html);
        }
    }

    fn pager_controls(&self) -> Vec<PagerControl> {
        let Some(html) = self.regions.get(&Region::Pager) else {
            return Vec::new();
        };
        let fragment = Html::parse_fragment(html);
        let buttons = selector("button");
        fragment
            .select(&buttons)
            .map(|b| PagerControl {
                label: b.text().collect::<String>().trim().to_string(),
                offset: b.value().attr("data-offset").and_then(|o| o.parse().ok()),
                disabled: b.value().attr("disabled").is_some(),
            })
            .collect()
    }

    fn modal_openers(&self) -> Vec<String> {
        let Some(html) = self.regions.get(&Region::CardList) else {
            return Vec::new();
        };
        let fragment = Html::parse_fragment(html);
        let openers = selector("button[data-modal-id]");
        fragment
            .select(&openers)
            .filter_map(|b| b.value().attr("data-modal-id"))
            .map(str::to_string)
            .collect()
    }

    fn modal(&self, id: &str) -> Option<ModalElement> {
        self.modals.iter().find(|m| m.id == id).cloned()
    }

    /// Also rewrites the dialog's tag in the modal region, so `region_html`
    /// shows the same state as `modal`.
    fn set_modal(&mut self, element: ModalElement) -> bool {
        let Some(slot) = self.modals.iter_mut().find(|m| m.id == element.id) else {
            return false;
        };
        let patched = self
            .regions
            .get(&Region::Modals)
            .and_then(|html| patch_dialog(html, &element));
        if let Some(html) = patched {
            self.regions.insert(Region::Modals, html);
        }
        *slot = element;
        true
    }

    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }

    fn show_notice(&mut self, message: Option<&str>) {
        self.notice = message.map(str::to_string);
    }
}

fn parse_modals(html: &str) -> Vec<ModalElement> {
    let fragment = Html::parse_fragment(html);
    let dialogs = selector("[data-modal-id]");
    let iframe = selector("iframe");
    fragment
        .select(&dialogs)
        .filter_map(|el| {
            let id = el.value().attr("data-modal-id")?.to_string();
            let player_src = el
                .select(&iframe)
                .next()
                .and_then(|f| f.value().attr("src"))
                .map(str::to_string);
            Some(ModalElement {
                id,
                hidden: el.value().attr("hidden").is_some(),
                player_src,
            })
        })
        .collect()
}

/// Rewrite one dialog's `hidden` flag and player `src` in the region markup.
/// `None` when the dialog's opening tag cannot be located.
fn patch_dialog(html: &str, element: &ModalElement) -> Option<String> {
    let marker = format!(r#"data-modal-id="{}""#, attr(&element.id));
    let open = html[..html.find(&marker)?].rfind('<')?;
    let (attrs, end) = scan_tag(&html[open..])?;
    let dialog_end = open + end;

    let mut out = String::with_capacity(html.len() + 16);
    out.push_str(&html[..open]);
    let dialog = &html[open..dialog_end];
    out.push_str(&with_flag(dialog, &attrs, "hidden", element.hidden));
    let rest = &html[dialog_end..];
    match (&element.player_src, rest.find("<iframe")) {
        (Some(src), Some(at)) => {
            let (attrs, end) = scan_tag(&rest[at..])?;
            out.push_str(&rest[..at]);
            out.push_str(&with_value(&rest[at..at + end], &attrs, "src", src));
            out.push_str(&rest[at + end..]);
        }
        _ => out.push_str(rest),
    }
    Some(out)
}

/// Byte span of one attribute inside an opening tag.
struct AttrSpan {
    start: usize,
    name_end: usize,
    end: usize,
}

/// Attribute spans of the opening tag at the start of `tag`, and the index of its `>`.
fn scan_tag(tag: &str) -> Option<(Vec<AttrSpan>, usize)> {
    let bytes = tag.as_bytes();
    let skip = |mut i: usize, pred: &dyn Fn(u8) -> bool| {
        while i < bytes.len() && pred(bytes[i]) {
            i += 1;
        }
        i
    };
    let in_name = |b: u8| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/');

    let mut i = skip(1, &|b| !b.is_ascii_whitespace() && b != b'>');
    let mut attrs = Vec::new();
    loop {
        i = skip(i, &|b| b.is_ascii_whitespace() || b == b'/');
        if *bytes.get(i)? == b'>' {
            return Some((attrs, i));
        }
        let start = i;
        i = skip(i, &in_name);
        let name_end = i;
        let eq = skip(i, &|b| b.is_ascii_whitespace());
        if bytes.get(eq) == Some(&b'=') {
            let value = skip(eq + 1, &|b| b.is_ascii_whitespace());
            i = match *bytes.get(value)? {
                quote @ (b'"' | b'\'') => value + 2 + tag[value + 1..].find(quote as char)?,
                _ => skip(value, &|b| !b.is_ascii_whitespace() && b != b'>'),
            };
        }
        attrs.push(AttrSpan {
            start,
            name_end,
            end: i,
        });
    }
}

fn find_attr<'a>(tag: &str, attrs: &'a [AttrSpan], name: &str) -> Option<&'a AttrSpan> {
    attrs
        .iter()
        .find(|a| tag[a.start..a.name_end].eq_ignore_ascii_case(name))
}

fn append_attr(tag: &str, text: &str) -> String {
    match tag.strip_suffix('/') {
        Some(head) => format!("{} {text}/", head.trim_end()),
        None => format!("{tag} {text}"),
    }
}

fn with_flag(tag: &str, attrs: &[AttrSpan], name: &str, on: bool) -> String {
    match (find_attr(tag, attrs, name), on) {
        (Some(span), false) => {
            let head = tag[..span.start].trim_end();
            format!("{head}{}", &tag[span.end..])
        }
        (None, true) => append_attr(tag, name),
        _ => tag.to_string(),
    }
}

fn with_value(tag: &str, attrs: &[AttrSpan], name: &str, value: &str) -> String {
    let rendered = format!(r#"{name}="{}""#, attr(value));
    match find_attr(tag, attrs, name) {
        Some(span) => format!("{}{rendered}{}", &tag[..span.start], &tag[span.end..]),
        None => append_attr(tag, &rendered),
    }
}

fn selector(css: &str) -> Selector {
    // Only called with the literal selectors above.
    Selector::parse(css).unwrap_or_else(|_| unreachable!("invalid built-in selector {css}"))
}
