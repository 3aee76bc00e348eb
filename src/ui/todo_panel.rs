/// To-do list panel

use crate::clock::{Clock, SystemClock};
use crate::storage::StorageHandle;
use crate::todos::{TodoStore, format_due, needs_attention, parse_due_input};
use crate::ui::components::Notice;
use patternfly_yew::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties)]
pub struct TodoPanelProps {
    pub storage: StorageHandle,
    pub on_notice: Callback<Notice>,
}

impl PartialEq for TodoPanelProps {
    fn eq(&self, other: &Self) -> bool {
        std::rc::Rc::ptr_eq(&self.storage, &other.storage) && self.on_notice == other.on_notice
    }
}

#[function_component(TodoPanel)]
pub fn todo_panel(props: &TodoPanelProps) -> Html {
    let store = {
        let storage = props.storage.clone();
        use_mut_ref(move || TodoStore::load(storage))
    };
    let force_update = use_force_update();
    let text = use_state(String::new);
    let due_input = use_state(String::new);

    let on_text_input = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                text.set(input.value());
            }
        })
    };

    let on_due_input = {
        let due_input = due_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                due_input.set(input.value());
            }
        })
    };

    let add_todo = {
        let store = store.clone();
        let text = text.clone();
        let due_input = due_input.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();

        Callback::from(move |_: ()| {
            let due_date = parse_due_input(&due_input, &SystemClock);
            let result = store.borrow_mut().add(&text, due_date).map(|_| ());
            match result {
                Ok(()) => {
                    text.set(String::new());
                    due_input.set(String::new());
                    force_update.force_update();
                }
                Err(e) => on_notice.emit(Notice::error(e.to_string())),
            }
        })
    };

    let on_keydown = {
        let add_todo = add_todo.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                add_todo.emit(());
            }
        })
    };

    let on_toggle = {
        let store = store.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();
        Callback::from(move |id: String| {
            if let Err(e) = store.borrow_mut().toggle(&id) {
                on_notice.emit(Notice::error(e.to_string()));
            }
            force_update.force_update();
        })
    };

    let on_delete = {
        let store = store.clone();
        let on_notice = props.on_notice.clone();
        let force_update = force_update.clone();
        Callback::from(move |id: String| {
            if let Err(e) = store.borrow_mut().delete(&id) {
                on_notice.emit(Notice::error(e.to_string()));
            }
            force_update.force_update();
        })
    };

    // Overdue is evaluated fresh on every render
    let now = SystemClock.now();
    let store_ref = store.borrow();

    html! {
        <div class="todo-panel">
            <div class="todo-form">
                <input
                    type="text"
                    placeholder="Add a to-do..."
                    value={(*text).clone()}
                    oninput={on_text_input}
                    onkeydown={on_keydown}
                    class="todo-input"
                />
                <input
                    type="datetime-local"
                    value={(*due_input).clone()}
                    oninput={on_due_input}
                    class="todo-due-input"
                />
                <Button onclick={add_todo.reform(|_| ())}>
                    {"Add"}
                </Button>
            </div>

            <div class="todo-list">
                {for store_ref.items().iter().map(|item| {
                    let attention = needs_attention(item, now);
                    let row_class = if attention { "todo-item overdue" } else { "todo-item" };
                    let text_class = if item.completed { "todo-text completed" } else { "todo-text" };
                    let toggle_id = item.id.clone();
                    let delete_id = item.id.clone();

                    html! {
                        <div key={item.id.clone()} class={row_class}>
                            <input
                                type="checkbox"
                                checked={item.completed}
                                onchange={on_toggle.reform(move |_: Event| toggle_id.clone())}
                            />
                            <div class="todo-body">
                                <span class={text_class}>{&item.text}</span>
                                <span class="todo-due">
                                    {format_due(item.due_date, &SystemClock)}
                                    if attention {
                                        {" (overdue)"}
                                    }
                                </span>
                            </div>
                            <Button
                                onclick={on_delete.reform(move |_| delete_id.clone())}
                                variant={ButtonVariant::Plain}
                                size={ButtonSize::Small}
                            >
                                {"✗"}
                            </Button>
                        </div>
                    }
                })}
            </div>
        </div>
    }
}
