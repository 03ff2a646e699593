use std::sync::Arc;

use dioxus::events::Key;
use dioxus::prelude::*;
use futures::StreamExt;

use crate::ai::{ChatClient, ChatSession, DecoraAI};
use crate::chat::ChatThread;
use crate::types::{ChatMessage, Role};
use crate::views::shared::{format_message_timestamp, markdown_to_html};

fn is_streaming_message(stream: Option<usize>, index: usize) -> bool {
    matches!(stream, Some(idx) if idx == index)
}

fn is_pending_assistant(msg: &ChatMessage, stream: Option<usize>, index: usize) -> bool {
    matches!(msg.role, Role::Assistant)
        && is_streaming_message(stream, index)
        && msg.text.is_empty()
}

/// Floating chat window. One remote conversation context lives for as long
/// as the window is mounted; closing it discards the thread.
#[component]
pub fn DecoraChatbot(on_close: EventHandler<()>) -> Element {
    let ai = use_context::<Arc<DecoraAI>>();
    // One remote conversation per mounted window. Kept in a signal so the
    // send handler stays `Copy` and can back several event handlers.
    let session: Signal<Arc<dyn ChatSession>> = use_signal(move || ai.open_session());

    let mut thread = use_signal(ChatThread::new);
    let mut input = use_signal(String::new);

    let mut send_message = {
        move |text: String| {
            let Some(outbound) = thread.with_mut(|t| t.begin_send(&text)) else {
                return;
            };
            input.set(String::new());

            let session = session();
            spawn(async move {
                match session.send_streaming(&outbound).await {
                    Ok(mut stream) => {
                        let mut failed = false;
                        while let Some(piece) = stream.next().await {
                            match piece {
                                Ok(piece) => {
                                    thread.with_mut(|t| t.append_fragment(&piece));
                                }
                                Err(err) => {
                                    tracing::error!(error = %err, "chat reply failed mid-stream");
                                    thread.with_mut(|t| t.fail());
                                    failed = true;
                                    break;
                                }
                            }
                        }
                        if !failed {
                            thread.with_mut(|t| t.complete());
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "chat send failed");
                        thread.with_mut(|t| t.fail());
                    }
                }
            });
        }
    };

    let snapshot = thread();
    let pending = snapshot.is_pending();
    let current_stream = snapshot.streaming_index();

    rsx! {
        div { class: "chat-window",
            div { class: "chat-header",
                div { class: "chat-header-title",
                    div { class: "chat-avatar", "D" }
                    h3 { "Chat with Decora" }
                }
                button {
                    class: "chat-close",
                    aria_label: "Close chat",
                    onclick: move |_| on_close.call(()),
                    "×"
                }
            }

            div { class: "chat-list",
                for (i, msg) in snapshot.messages().iter().enumerate() {
                    div {
                        key: "{msg.id}",
                        class: format_args!("message-row {}", match msg.role { Role::User => "user", Role::Assistant => "assistant" }),
                        if matches!(msg.role, Role::Assistant) {
                            div { class: "avatar assistant", "D" }
                        }
                        div { class: "message-stack",
                            if is_pending_assistant(msg, current_stream, i) {
                                div { class: "shimmer-line",
                                    span { class: "shimmer-text", "Thinking…" }
                                }
                            } else {
                                div { class: format_args!("bubble {}", match msg.role { Role::User => "user", Role::Assistant => "assistant" }),
                                    if matches!(msg.role, Role::Assistant) {
                                        AssistantBubble {
                                            text: msg.text.clone(),
                                            show_copy: !is_streaming_message(current_stream, i),
                                        }
                                    } else {
                                        "{msg.text}"
                                    }
                                }
                            }
                            if let Some(ts) = format_message_timestamp(msg.created_at) {
                                div { class: format_args!(
                                        "message-meta {}",
                                        match msg.role { Role::User => "align-end", Role::Assistant => "align-start" }
                                    ),
                                    span { class: "message-timestamp", "{ts}" }
                                }
                            }
                        }
                    }
                }
            }

            div { class: "chat-composer",
                input {
                    r#type: "text",
                    placeholder: "Ask for design advice...",
                    value: "{input}",
                    disabled: pending,
                    oninput: move |ev| input.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                            ev.prevent_default();
                            let text = input();
                            send_message(text);
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    aria_label: "Send message",
                    disabled: pending || input().trim().is_empty(),
                    onclick: move |_| {
                        let text = input();
                        send_message(text);
                    },
                    "Send"
                }
            }
        }
    }
}

#[component]
fn AssistantBubble(text: String, show_copy: bool) -> Element {
    let content_html = markdown_to_html(&text);
    let copy_payload = text.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(any(feature = "desktop", feature = "mobile"))]
            {
                if let Ok(mut cb) = arboard::Clipboard::new() {
                    let _ = cb.set_text(raw);
                }
            }
            #[cfg(not(any(feature = "desktop", feature = "mobile")))]
            let _ = raw;
        });
    };

    rsx! {
        if show_copy && !text.is_empty() {
            div { class: "bubble-controls",
                button { class: "action-btn", title: "Copy reply", onclick: on_copy, "Copy" }
            }
        }
        div { class: "md", dangerous_inner_html: "{content_html}" }
    }
}
