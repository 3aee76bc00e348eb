/// New tab page for XTab

use crate::clock::{ClockLifecycle, DashboardClock, IntervalTicker, SystemClock};
use crate::config::RemoteConfig;
use crate::preferences;
use crate::search::{SearchLog, search_url};
use crate::sites::SiteCatalog;
use crate::storage::{StorageHandle, open_browser_storage};
use crate::sync::{SupabaseTable, sync_sites};
use crate::ui::chat_panel::ChatPanel;
use crate::ui::components::{Notice, NoticeBanner, SiteTile, open_in_new_tab};
use crate::ui::todo_panel::TodoPanel;
use patternfly_yew::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum SyncState {
    Idle,
    Running,
}

/// Bumped on every date tick, including the one fired when the page is shown again
#[derive(Default, PartialEq)]
struct Refresh(u32);

impl Reducible for Refresh {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(Refresh(self.0.wrapping_add(1)))
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let storage: StorageHandle = (*use_memo((), |_| open_browser_storage())).clone();
    let config = use_memo((), |_| RemoteConfig::from_build_env());
    let notice = use_state(|| None::<Notice>);
    let refresh = use_reducer(Refresh::default);
    let is_simple = {
        let storage = storage.clone();
        use_state(move || preferences::is_simple(&*storage))
    };

    let on_notice = {
        let notice = notice.clone();
        Callback::from(move |n: Notice| notice.set(Some(n)))
    };

    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |_: ()| notice.set(None))
    };

    let on_date_tick = {
        let dispatcher = refresh.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(()))
    };

    let on_toggle_layout = {
        let storage = storage.clone();
        let is_simple = is_simple.clone();
        let on_notice = on_notice.clone();
        Callback::from(move |_: MouseEvent| {
            let simple = !*is_simple;
            if let Err(e) = preferences::set_simple(&*storage, simple) {
                on_notice.emit(Notice::error(e.to_string()));
            }
            is_simple.set(simple);
        })
    };

    html! {
        <div class="xtab">
            <ClockHeader on_date_tick={on_date_tick} />
            <NoticeBanner notice={(*notice).clone()} on_dismiss={on_dismiss} />
            <SearchPanel
                storage={storage.clone()}
                simple={*is_simple}
                refresh={refresh.0}
                on_notice={on_notice.clone()}
            />

            if !*is_simple {
                <SitePanel
                    storage={storage.clone()}
                    config={(*config).clone()}
                    refresh={refresh.0}
                    on_notice={on_notice.clone()}
                />
                <TodoPanel storage={storage.clone()} on_notice={on_notice.clone()} />
                if config.chat_enabled() {
                    <ChatPanel config={(*config).clone()} on_notice={on_notice.clone()} />
                }
            }

            <div class="footer">
                <Button onclick={on_toggle_layout} variant={ButtonVariant::Link}>
                    {if *is_simple { "Show everything" } else { "Simple mode" }}
                </Button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ClockHeaderProps {
    on_date_tick: Callback<()>,
}

/// Date and time, refreshed while the tab is visible
#[function_component(ClockHeader)]
fn clock_header(props: &ClockHeaderProps) -> Html {
    let time_text = use_state(|| DashboardClock::new(SystemClock).time_text());
    let date_text = use_state(|| DashboardClock::new(SystemClock).date_text());

    {
        let time_text = time_text.clone();
        let date_text = date_text.clone();
        let on_date_tick = props.on_date_tick.clone();

        use_effect_with((), move |_| {
            let lifecycle = Rc::new(RefCell::new(ClockLifecycle::new(
                IntervalTicker::default(),
                IntervalTicker::default(),
                Rc::new(move || time_text.set(DashboardClock::new(SystemClock).time_text())),
                Rc::new(move || {
                    date_text.set(DashboardClock::new(SystemClock).date_text());
                    on_date_tick.emit(());
                }),
            )));

            let document = web_sys::window().and_then(|w| w.document());
            let listener = document.as_ref().map(|document| {
                lifecycle.borrow_mut().set_hidden(document.hidden());

                let lifecycle = lifecycle.clone();
                let target = document.clone();
                let closure = Closure::<dyn Fn()>::new(move || {
                    lifecycle.borrow_mut().set_hidden(target.hidden());
                });
                if let Err(e) = document.add_event_listener_with_callback(
                    "visibilitychange",
                    closure.as_ref().unchecked_ref(),
                ) {
                    log::error!("Failed to watch page visibility: {:?}", e);
                }
                closure
            });

            move || {
                if let (Some(document), Some(closure)) = (document, listener) {
                    if let Err(e) = document.remove_event_listener_with_callback(
                        "visibilitychange",
                        closure.as_ref().unchecked_ref(),
                    ) {
                        log::error!("Failed to stop watching page visibility: {:?}", e);
                    }
                }
                lifecycle.borrow_mut().suspend();
            }
        });
    }

    html! {
        <header class="clock-header">
            <h2 class="clock-date">{(*date_text).clone()}</h2>
            <div class="clock-time">{(*time_text).clone()}</div>
        </header>
    }
}

#[derive(Properties)]
struct SearchPanelProps {
    storage: StorageHandle,
    simple: bool,
    refresh: u32,
    on_notice: Callback<Notice>,
}

impl PartialEq for SearchPanelProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
            && self.simple == other.simple
            && self.refresh == other.refresh
            && self.on_notice == other.on_notice
    }
}

/// Search box plus today's history
#[function_component(SearchPanel)]
fn search_panel(props: &SearchPanelProps) -> Html {
    let history = {
        let storage = props.storage.clone();
        use_mut_ref(move || SearchLog::load(storage, SystemClock))
    };
    let force_update = use_force_update();

    {
        let history = history.clone();
        let force_update = force_update.clone();
        use_effect_with(props.refresh, move |_| {
            history.borrow_mut().reload();
            force_update.force_update();
        });
    }

    let on_keydown = {
        let history = history.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();

        Callback::from(move |e: KeyboardEvent| {
            if e.key() != "Enter" {
                return;
            }
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let keyword = input.value();
            if keyword.trim().is_empty() {
                return;
            }

            match search_url(&keyword) {
                Ok(url) => open_in_new_tab(&url),
                Err(e) => {
                    on_notice.emit(Notice::error(e.to_string()));
                    return;
                }
            }
            if let Err(e) = history.borrow_mut().record(&keyword) {
                log::warn!("Search not recorded: {}", e);
            }
            input.set_value("");
            force_update.force_update();
        })
    };

    let on_history_click = Callback::from(move |keyword: String| {
        if let Ok(url) = search_url(&keyword) {
            open_in_new_tab(&url);
        }
    });

    let on_clear = {
        let history = history.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = history.borrow_mut().clear() {
                on_notice.emit(Notice::error(e.to_string()));
            }
            force_update.force_update();
        })
    };

    let history_ref = history.borrow();

    html! {
        <div class="search-panel">
            <input
                type="text"
                placeholder="Search the web"
                onkeydown={on_keydown}
                class="search-input"
            />
            if !props.simple && !history_ref.entries().is_empty() {
                <div class="search-history">
                    {for history_ref.entries().iter().rev().map(|entry| {
                        let keyword = entry.keyword.clone();
                        html! {
                            <span
                                class="search-keyword"
                                onclick={on_history_click.reform(move |_: MouseEvent| keyword.clone())}
                            >
                                {&entry.keyword}
                            </span>
                        }
                    })}
                    <Button onclick={on_clear} variant={ButtonVariant::Link}>
                        {"Clear"}
                    </Button>
                </div>
            }
        </div>
    }
}

#[derive(Properties)]
struct SitePanelProps {
    storage: StorageHandle,
    config: RemoteConfig,
    refresh: u32,
    on_notice: Callback<Notice>,
}

impl PartialEq for SitePanelProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
            && self.config == other.config
            && self.refresh == other.refresh
            && self.on_notice == other.on_notice
    }
}

/// Bookmarked sites with add/delete and remote sync
#[function_component(SitePanel)]
fn site_panel(props: &SitePanelProps) -> Html {
    let catalog = {
        let storage = props.storage.clone();
        use_mut_ref(move || {
            SiteCatalog::initialize(storage.clone()).unwrap_or_else(|e| {
                log::error!("Failed to seed site catalog: {}", e);
                SiteCatalog::load(storage)
            })
        })
    };
    let force_update = use_force_update();
    let name = use_state(String::new);
    let url = use_state(String::new);
    let sync_state = use_state(|| SyncState::Idle);

    // Other tabs may have edited the catalog while this one was hidden
    {
        let catalog = catalog.clone();
        let force_update = force_update.clone();
        use_effect_with(props.refresh, move |_| {
            catalog.borrow_mut().reload();
            force_update.force_update();
        });
    }

    let on_name_input = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                name.set(input.value());
            }
        })
    };

    let on_url_input = {
        let url = url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                url.set(input.value());
            }
        })
    };

    let on_add = {
        let catalog = catalog.clone();
        let name = name.clone();
        let url = url.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();

        Callback::from(move |_: MouseEvent| {
            let result = catalog.borrow_mut().add(&name, &url).map(|_| ());
            match result {
                Ok(()) => {
                    name.set(String::new());
                    url.set(String::new());
                    force_update.force_update();
                }
                Err(e) => on_notice.emit(Notice::error(e.to_string())),
            }
        })
    };

    let on_delete = {
        let catalog = catalog.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();

        Callback::from(move |site_url: String| {
            if let Err(e) = catalog.borrow_mut().delete(&site_url) {
                on_notice.emit(Notice::error(e.to_string()));
            }
            force_update.force_update();
        })
    };

    let on_sync = {
        let catalog = catalog.clone();
        let config = props.config.clone();
        let on_notice = props.on_notice.clone();
        let sync_state = sync_state.clone();

        Callback::from(move |_: MouseEvent| {
            if *sync_state == SyncState::Running {
                return;
            }
            let table = match SupabaseTable::from_config(&config) {
                Ok(table) => table,
                Err(e) => {
                    on_notice.emit(Notice::error(e.to_string()));
                    return;
                }
            };
            let sites = catalog.borrow().sites().to_vec();
            let on_notice = on_notice.clone();
            let sync_state = sync_state.clone();
            sync_state.set(SyncState::Running);

            spawn_local(async move {
                match sync_sites(&table, &sites, &SystemClock).await {
                    Ok(report) => on_notice.emit(Notice::success(report.summary())),
                    Err(e) => {
                        log::error!("Site sync failed: {}", e);
                        on_notice.emit(Notice::error(format!("Sync failed: {}", e)));
                    }
                }
                sync_state.set(SyncState::Idle);
            });
        })
    };

    let catalog_ref = catalog.borrow();
    let is_syncing = *sync_state == SyncState::Running;

    html! {
        <div class="site-panel">
            <div class="site-grid">
                {for catalog_ref.sites().iter().enumerate().map(|(index, site)| html! {
                    <SiteTile key={format!("{}-{}", index, site.url)} site={site.clone()} on_delete={on_delete.clone()} />
                })}
            </div>
            <div class="site-form">
                <input
                    type="text"
                    placeholder="Name"
                    value={(*name).clone()}
                    oninput={on_name_input}
                    class="site-input"
                />
                <input
                    type="text"
                    placeholder="https://"
                    value={(*url).clone()}
                    oninput={on_url_input}
                    class="site-input"
                />
                <Button onclick={on_add}>
                    {"Add site"}
                </Button>
                if props.config.sync_enabled() {
                    <Button onclick={on_sync} disabled={is_syncing} variant={ButtonVariant::Secondary}>
                        {if is_syncing { "Syncing..." } else { "Sync to cloud" }}
                    </Button>
                }
            </div>
        </div>
    }
}
