use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use url::{form_urlencoded, Url};

use crate::mapping::video_id_from;
use crate::types::{CardModel, ModalDescriptor};

/// Display variants that list in the compact narrow layout.
pub const NARROW_CATEGORIES: [&str; 5] = [
    "Press Center",
    "Leadership Messages",
    "University Updates",
    "Announcements",
    "In the News",
];

pub const DEFAULT_PLAYER_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Narrow,
    Standard,
}

pub fn layout_for(display: &str) -> LayoutKind {
    if NARROW_CATEGORIES.contains(&display) {
        LayoutKind::Narrow
    } else {
        LayoutKind::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub html: String,
    pub modal: Option<ModalDescriptor>,
}

/// Render one card; video cards also yield the descriptor for their dialog.
pub fn render_card(model: &CardModel, display: &str) -> RenderedCard {
    let html = match layout_for(display) {
        LayoutKind::Narrow => narrow_card(model),
        LayoutKind::Standard => standard_card(model),
    };
    RenderedCard {
        html,
        modal: modal_for(model),
    }
}

fn modal_for(model: &CardModel) -> Option<ModalDescriptor> {
    if !model.is_video() {
        return None;
    }
    let video_id = model.video_url.as_deref().map(video_id_from);
    Some(ModalDescriptor {
        unique_id: model.unique_id.clone(),
        video_id: video_id.unwrap_or_default(),
        title: format!("Watch {}", model.title),
        is_vertical: model.size.as_deref() == Some("vertical-video"),
        no_auto_play: true,
    })
}

fn narrow_card(model: &CardModel) -> String {
    let mut out = String::from(
        r#"<article class="listing-card listing-card--narrow" data-testid="narrow-horizontal-card">"#,
    );
    if let Some(kind) = &model.kind {
        out.push_str(&format!(
            r#"<span class="listing-card__type">{}</span>"#,
            text(kind)
        ));
    }
    out.push_str(&title_block(model));
    if let Some(date) = &model.date {
        out.push_str(&date_block(date));
    }
    if model.is_video() {
        out.push_str(&video_trigger(model));
    }
    out.push_str("</article>");
    out
}

fn standard_card(model: &CardModel) -> String {
    let teaser = if model.is_teaser {
        " listing-card--teaser"
    } else {
        ""
    };
    let mut out = format!(
        r#"<article class="listing-card listing-card--horizontal{teaser}" data-testid="horizontal-card">"#
    );
    if let Some(src) = &model.image_url {
        out.push_str(&format!(
            r#"<div class="listing-card__media"><img src="{}" alt="{}" loading="lazy">"#,
            attr(src),
            attr(model.image_alt.as_deref().unwrap_or_default()),
        ));
        if model.is_video() {
            out.push_str(&video_trigger(model));
        }
        out.push_str("</div>");
    } else if model.is_video() {
        out.push_str(&video_trigger(model));
    }
    out.push_str(r#"<div class="listing-card__content">"#);
    if let Some(taxonomy) = &model.taxonomy {
        match &model.taxonomy_url {
            Some(href) => out.push_str(&format!(
                r#"<a class="listing-card__taxonomy" href="{}">{}</a>"#,
                attr(href),
                text(taxonomy)
            )),
            None => out.push_str(&format!(
                r#"<span class="listing-card__taxonomy">{}</span>"#,
                text(taxonomy)
            )),
        }
    }
    out.push_str(&title_block(model));
    if let Some(description) = &model.description {
        out.push_str(&format!(
            r#"<p class="listing-card__description">{}</p>"#,
            text(description)
        ));
    }
    if let Some(date) = &model.date {
        out.push_str(&date_block(date));
    }
    out.push_str("</div></article>");
    out
}

fn title_block(model: &CardModel) -> String {
    match &model.live_url {
        Some(href) => format!(
            r#"<h3 class="listing-card__title"><a href="{}">{}</a></h3>"#,
            attr(href),
            text(&model.title)
        ),
        None => format!(
            r#"<h3 class="listing-card__title">{}</h3>"#,
            text(&model.title)
        ),
    }
}

fn date_block(date: &str) -> String {
    format!(
        r#"<time class="listing-card__date" datetime="{}">{}</time>"#,
        attr(date),
        text(date)
    )
}

fn video_trigger(model: &CardModel) -> String {
    format!(
        r#"<button type="button" class="listing-card__play" data-modal-id="{}" aria-label="{}">Play video</button>"#,
        attr(&model.unique_id),
        attr(&format!("Watch {}", model.title)),
    )
}

/// Player URL for a video, always starting with `autoplay=0`.
///
/// The id is appended as one path segment of the base, so it can never
/// change the player's origin.
pub fn embed_url(player_base: &str, descriptor: &ModalDescriptor) -> String {
    let autoplay = if descriptor.no_auto_play { "0" } else { "1" };
    match Url::parse(player_base) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if !descriptor.video_id.is_empty() {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(&descriptor.video_id);
                }
            }
            url.query_pairs_mut()
                .append_pair("autoplay", autoplay)
                .append_pair("rel", "0");
            url.to_string()
        }
        _ => {
            let id: String =
                form_urlencoded::byte_serialize(descriptor.video_id.as_bytes()).collect();
            format!("{player_base}{id}?autoplay={autoplay}&rel=0")
        }
    }
}

/// Dialog markup; every modal starts hidden.
pub fn render_modal(descriptor: &ModalDescriptor, player_base: &str) -> String {
    let orientation = if descriptor.is_vertical {
        " video-modal__dialog--vertical"
    } else {
        ""
    };
    format!(
        concat!(
            r#"<div class="video-modal" data-modal-id="{id}" role="dialog" aria-modal="true" aria-label="{title}" hidden>"#,
            r#"<div class="video-modal__dialog{orientation}">"#,
            r#"<button type="button" class="video-modal__close" data-modal-close aria-label="Close video">&times;</button>"#,
            r#"<iframe src="{src}" title="{title}" allow="autoplay; encrypted-media; picture-in-picture" allowfullscreen></iframe>"#,
            r#"</div></div>"#
        ),
        id = attr(&descriptor.unique_id),
        title = attr(&descriptor.title),
        orientation = orientation,
        src = attr(&embed_url(player_base, descriptor)),
    )
}

pub fn render_modals(descriptors: &[ModalDescriptor], player_base: &str) -> String {
    descriptors
        .iter()
        .map(|d| render_modal(d, player_base))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::normalize;
    use crate::types::RawResult;

    fn card(kind: &str) -> CardModel {
        normalize(&RawResult {
            title: Some("Commencement 2024".into()),
            live_url: Some("https://news.example.edu/commencement".into()),
            kind: Some(kind.into()),
            ..Default::default()
        })
    }

    #[test]
    fn narrow_categories_route_to_narrow_layout() {
        for display in NARROW_CATEGORIES {
            assert_eq!(layout_for(display), LayoutKind::Narrow, "{display}");
            let html = render_card(&card("Story"), display).html;
            assert!(html.contains("narrow-horizontal-card"));
        }
    }

    #[test]
    fn anything_else_routes_to_standard_layout() {
        for display in ["", "Stories", "press center", "Announcements ", "Video"] {
            assert_eq!(layout_for(display), LayoutKind::Standard, "{display:?}");
            let html = render_card(&card("Story"), display).html;
            assert!(html.contains(r#"data-testid="horizontal-card""#));
            assert!(!html.contains("narrow-horizontal-card"));
        }
    }

    #[test]
    fn missing_optional_fields_omit_their_blocks() {
        let html = render_card(&normalize(&RawResult::default()), "").html;
        assert!(!html.contains("listing-card__description"));
        assert!(!html.contains("listing-card__taxonomy"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<time"));
    }

    #[test]
    fn image_without_alt_renders_empty_alt() {
        let mut model = card("Story");
        model.image_url = Some("/a.jpg".into());
        let html = render_card(&model, "").html;
        assert!(html.contains(r#"<img src="/a.jpg" alt="""#));
    }

    #[test]
    fn text_is_escaped() {
        let mut model = card("Story");
        model.title = "<b>Tom & Jerry</b>".into();
        let html = render_card(&model, "").html;
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
    }

    #[test]
    fn video_card_yields_one_modal() {
        let mut model = card("Video");
        model.video_url = Some("abc123".into());
        let rendered = render_card(&model, "");
        let modal = rendered.modal.expect("video modal");
        assert_eq!(modal.video_id, "abc123");
        assert_eq!(modal.title, "Watch Commencement 2024");
        assert_eq!(modal.unique_id, model.unique_id);
        assert!(modal.no_auto_play);
        assert!(!modal.is_vertical);
        let trigger = format!(r#"data-modal-id="{}""#, model.unique_id);
        assert!(rendered.html.contains(&trigger));
    }

    #[test]
    fn vertical_size_marks_modal_vertical() {
        let mut model = card("Story");
        model.video_url = Some("short1".into());
        model.size = Some("vertical-video".into());
        let modal = render_card(&model, "").modal.unwrap();
        assert!(modal.is_vertical);
        let html = render_modal(&modal, DEFAULT_PLAYER_BASE);
        assert!(html.contains("video-modal__dialog--vertical"));
    }

    #[test]
    fn non_video_card_has_no_modal() {
        assert!(render_card(&card("Story"), "").modal.is_none());
    }

    #[test]
    fn modal_starts_hidden_with_autoplay_off() {
        let descriptor = ModalDescriptor {
            unique_id: "m1".into(),
            video_id: "abc123".into(),
            title: "Watch Clip".into(),
            is_vertical: false,
            no_auto_play: true,
        };
        let html = render_modal(&descriptor, DEFAULT_PLAYER_BASE);
        assert!(html.contains(" hidden>"));
        assert!(html.contains(
            "https://www.youtube.com/embed/abc123?autoplay=0&amp;rel=0"
        ));
    }

    #[test]
    fn player_origin_always_comes_from_the_base() {
        for video_url in ["//evil.example/x", "https://vimeo.com/123", "abc:def", "../x"] {
            let mut model = card("Video");
            model.video_url = Some(video_url.into());
            let modal = render_card(&model, "").modal.unwrap();
            assert_eq!(
                embed_url(DEFAULT_PLAYER_BASE, &modal),
                "https://www.youtube.com/embed/?autoplay=0&rel=0",
                "{video_url:?}"
            );
        }
    }

    #[test]
    fn video_id_is_a_single_path_segment() {
        let descriptor = |video_id: &str| ModalDescriptor {
            unique_id: "m1".into(),
            video_id: video_id.into(),
            title: "Watch Clip".into(),
            is_vertical: false,
            no_auto_play: true,
        };
        assert_eq!(
            embed_url("https://player.example.edu/embed", &descriptor("abc123")),
            "https://player.example.edu/embed/abc123?autoplay=0&rel=0"
        );
        let hostile = embed_url(DEFAULT_PLAYER_BASE, &descriptor("//evil.example/x"));
        assert!(
            hostile.starts_with("https://www.youtube.com/embed/"),
            "{hostile}"
        );
        assert!(!hostile.contains("//evil"), "{hostile}");
    }
}
