/// Reusable UI components

use crate::records::Site;
use gloo_timers::callback::Timeout;
use patternfly_yew::prelude::*;
use url::Url;
use yew::prelude::*;

/// How long a notice stays on screen
const NOTICE_MS: u32 = 4_000;

#[derive(Clone, PartialEq, Debug)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient feedback for a user action
#[derive(Clone, PartialEq, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: Option<Notice>,
    pub on_dismiss: Callback<()>,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with(props.notice.clone(), move |notice| {
            let timeout = notice
                .as_ref()
                .map(|_| Timeout::new(NOTICE_MS, move || on_dismiss.emit(())));
            move || drop(timeout)
        });
    }

    match &props.notice {
        Some(notice) => {
            let alert_type = match notice.kind {
                NoticeKind::Success => AlertType::Success,
                NoticeKind::Error => AlertType::Danger,
            };
            html! {
                <div class="notice">
                    <Alert r#type={alert_type} title={notice.message.clone()} inline={true}>
                    </Alert>
                </div>
            }
        }
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct SiteTileProps {
    pub site: Site,
    pub on_delete: Callback<String>,
}

#[function_component(SiteTile)]
pub fn site_tile(props: &SiteTileProps) -> Html {
    let site = &props.site;

    html! {
        <div class="site-tile">
            <a href={site.url.clone()} target="_blank" class="site-link">
                <img src={site.icon.clone()} alt="" class="site-icon" />
                <span class="site-name">{&site.name}</span>
            </a>
            <Button
                onclick={props.on_delete.reform({
                    let url = site.url.clone();
                    move |_| url.clone()
                })}
                variant={ButtonVariant::Plain}
                size={ButtonSize::Small}
            >
                {"✗"}
            </Button>
        </div>
    }
}

/// Open a URL in a new browsing context
pub fn open_in_new_tab(url: &Url) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.open_with_url_and_target(url.as_str(), "_blank") {
        log::error!("Failed to open {}: {:?}", url, e);
    }
}
