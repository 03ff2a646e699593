use dioxus::prelude::*;

use crate::views::{DecoraChatbot, RoomDesigner};

const DECORA_CSS: Asset = asset!("/assets/decora.css");

/// Top-level shell: page chrome, the designer flow, and the chatbot toggle.
/// The shared AI client is injected as root context from `main`.
#[component]
pub fn App() -> Element {
    let mut chat_open = use_signal(|| false);

    rsx! {
        document::Link { rel: "stylesheet", href: DECORA_CSS }
        AppHeader {}
        main { class: "content",
            RoomDesigner {}
        }
        AppFooter {}

        if chat_open() {
            DecoraChatbot { on_close: move |_| chat_open.set(false) }
        } else {
            button {
                class: "chat-toggle",
                aria_label: "Open chat",
                onclick: move |_| chat_open.set(true),
                "Chat"
            }
        }
    }
}

#[component]
fn AppHeader() -> Element {
    rsx! {
        header { class: "header",
            div { class: "header-inner",
                span { class: "wordmark", "Exceldes" }
                span { class: "tagline", "AI Interior Design" }
            }
        }
    }
}

#[component]
fn AppFooter() -> Element {
    rsx! {
        footer { class: "footer",
            p { "Exceldes — re-imagine your space." }
        }
    }
}
