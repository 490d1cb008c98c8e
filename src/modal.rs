use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::SectionDom;

/// Open-state of a section's video dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open(String),
}

/// What happens to an already-open dialog when another one opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenPolicy {
    /// Close the open dialog first, so at most one is visible.
    #[default]
    CloseOthers,
    /// Leave it visible; only the newest dialog is tracked for close/Escape.
    KeepOthers,
}

#[derive(Debug, Default)]
pub struct ModalRegistry {
    state: ModalState,
    policy: OpenPolicy,
}

impl ModalRegistry {
    pub fn new(policy: OpenPolicy) -> Self {
        Self {
            state: ModalState::Closed,
            policy,
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn policy(&self) -> OpenPolicy {
        self.policy
    }

    /// Show the dialog with `id` and switch its player to autoplay.
    /// Unknown ids are ignored. Returns whether a dialog was opened.
    pub fn open<D: SectionDom + ?Sized>(&mut self, dom: &mut D, id: &str) -> bool {
        let Some(mut element) = dom.modal(id) else {
            debug!(modal_id = id, "open requested for unknown modal");
            return false;
        };
        if let ModalState::Open(current) = &self.state {
            if current != id && self.policy == OpenPolicy::CloseOthers {
                let current = current.clone();
                hide(dom, &current);
            }
        }
        element.hidden = false;
        element.player_src = element.player_src.map(|src| set_autoplay(&src, true));
        dom.set_modal(element);
        self.state = ModalState::Open(id.to_string());
        debug!(modal_id = id, "modal opened");
        true
    }

    /// Hide the tracked dialog and stop autoplay. No-op when nothing is open.
    pub fn close<D: SectionDom + ?Sized>(&mut self, dom: &mut D) -> bool {
        let ModalState::Open(id) = std::mem::take(&mut self.state) else {
            return false;
        };
        let closed = hide(dom, &id);
        if closed {
            debug!(modal_id = %id, "modal closed");
        }
        closed
    }

    /// Keyboard hook; only `Escape` does anything.
    pub fn handle_key<D: SectionDom + ?Sized>(&mut self, dom: &mut D, key: &str) -> bool {
        key == "Escape" && self.close(dom)
    }

    /// Forget the tracked dialog after its DOM has been replaced.
    pub fn reset(&mut self) {
        self.state = ModalState::Closed;
    }
}

fn hide<D: SectionDom + ?Sized>(dom: &mut D, id: &str) -> bool {
    let Some(mut element) = dom.modal(id) else {
        debug!(
            modal_id = id,
            "close requested for modal no longer in the section"
        );
        return false;
    };
    element.hidden = true;
    element.player_src = element.player_src.map(|src| set_autoplay(&src, false));
    dom.set_modal(element)
}

/// Rewrite the value of the `autoplay` query parameter, leaving every other byte untouched.
///
/// Only a segment whose key is exactly `autoplay` is changed; a src without one is returned as is.
pub fn set_autoplay(src: &str, on: bool) -> String {
    let (head, fragment) = match src.find('#') {
        Some(i) => src.split_at(i),
        None => (src, ""),
    };
    let Some((base, query)) = head.split_once('?') else {
        return src.to_string();
    };
    let value = if on { "1" } else { "0" };
    let rewritten: Vec<String> = query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some(("autoplay", _)) => format!("autoplay={value}"),
            _ => segment.to_string(),
        })
        .collect();
    format!("{base}?{}{fragment}", rewritten.join("&"))
}
