/// AI chat panel

use crate::chat::{Conversation, GeminiClient, TurnKind};
use crate::config::RemoteConfig;
use crate::ui::components::Notice;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ChatPanelProps {
    pub config: RemoteConfig,
    pub on_notice: Callback<Notice>,
}

#[function_component(ChatPanel)]
pub fn chat_panel(props: &ChatPanelProps) -> Html {
    let conversation = use_mut_ref(Conversation::new);
    let force_update = use_force_update();
    let question = use_state(String::new);
    let pending = use_state(|| false);

    let client = {
        let config = props.config.clone();
        use_memo(config, |config| GeminiClient::from_config(config).map(Rc::new))
    };

    let on_input = {
        let question = question.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                question.set(input.value());
            }
        })
    };

    let ask = {
        let conversation = conversation.clone();
        let question = question.clone();
        let pending = pending.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();
        let client = client.clone();

        Callback::from(move |_: ()| {
            if *pending {
                return;
            }
            if let Err(e) = Conversation::validate_question(&question) {
                on_notice.emit(Notice::error(e.to_string()));
                return;
            }
            let client = match &*client {
                Ok(client) => client.clone(),
                Err(e) => {
                    on_notice.emit(Notice::error(e.to_string()));
                    return;
                }
            };

            // The shared conversation is only replaced once the answer arrives
            let mut next = conversation.borrow().clone();
            let asked = (*question).clone();
            let conversation = conversation.clone();
            let question = question.clone();
            let pending = pending.clone();
            let on_notice = on_notice.clone();
            let force_update = force_update.clone();
            pending.set(true);

            spawn_local(async move {
                let outcome = next.ask(&*client, &asked).await.map(|_| ());
                match outcome {
                    Ok(()) => {
                        *conversation.borrow_mut() = next;
                        question.set(String::new());
                        force_update.force_update();
                    }
                    Err(e) => {
                        log::error!("Chat request failed: {}", e);
                        on_notice.emit(Notice::error(format!("AI request failed: {}", e)));
                    }
                }
                pending.set(false);
            });
        })
    };

    let on_keydown = {
        let ask = ask.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                ask.emit(());
            }
        })
    };

    let on_clear = {
        let conversation = conversation.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            conversation.borrow_mut().clear();
            force_update.force_update();
        })
    };

    let conversation_ref = conversation.borrow();

    html! {
        <div class="chat-panel">
            <div class="chat-turns">
                {for conversation_ref.turns().iter().map(|turn| {
                    let class = match turn.kind {
                        TurnKind::Question => "chat-turn question",
                        TurnKind::Answer => "chat-turn answer",
                    };
                    html! { <div class={class}>{&turn.content}</div> }
                })}
                if *pending {
                    <Spinner />
                }
            </div>
            <div class="chat-form">
                <input
                    type="text"
                    placeholder="Ask AI..."
                    value={(*question).clone()}
                    oninput={on_input}
                    onkeydown={on_keydown}
                    disabled={*pending}
                    class="chat-input"
                />
                <Button onclick={ask.reform(|_| ())} disabled={*pending}>
                    {"Send"}
                </Button>
                <Button onclick={on_clear} variant={ButtonVariant::Secondary} disabled={*pending}>
                    {"Clear"}
                </Button>
            </div>
        </div>
    }
}
