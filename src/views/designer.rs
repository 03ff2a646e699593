use std::sync::Arc;

use dioxus::prelude::*;

use crate::ai::{DecoraAI, DesignClient};
use crate::designer::DesignSession;
use crate::types::{DESIGN_STYLES, RoomType, SourceImage, Stage, mime_from_file_name};

/// The room-redesign flow: room type, photo, style, then the remote call and
/// a before/after result. All transitions go through [`DesignSession`].
#[component]
pub fn RoomDesigner() -> Element {
    let ai = use_context::<Arc<DecoraAI>>();

    // Same defaults the form opens with: a room and a preset style are
    // preselected, only the photo is missing.
    let mut session = use_signal(|| {
        let mut session = DesignSession::new();
        session.select_room_type(RoomType::LivingRoom);
        session.select_style("Modern Minimalist");
        session
    });

    let on_generate = move |_| {
        let request = match session.with_mut(|s| s.begin_generate()) {
            Ok(request) => request,
            // The session already reflects the reason (error stage or an
            // in-flight request); nothing to launch.
            Err(_) => return,
        };
        let ai = ai.clone();
        spawn(async move {
            let outcome = ai
                .generate(&request.image, request.room_type, &request.style)
                .await;
            if let Err(err) = &outcome {
                tracing::error!(error = %err, "design generation failed");
            }
            session.with_mut(|s| s.complete_generate(outcome));
        });
    };

    let snapshot = session();
    let panel = match snapshot.stage() {
        Stage::Loading => rsx! { LoadingPanel {} },
        Stage::Error => rsx! {
            ErrorPanel {
                message: snapshot.error_message().unwrap_or_default().to_string(),
                on_start_over: move |_| session.with_mut(|s| s.start_over()),
            }
        },
        Stage::Result => rsx! {
            ResultPanel {
                session,
                on_try_another: move |_| session.with_mut(|s| s.try_another_style()),
                on_start_over: move |_| session.with_mut(|s| s.start_over()),
            }
        },
        Stage::Initial | Stage::Preview => rsx! {
            StepPanels { session, on_generate }
        },
    };

    rsx! {
        section { class: "hero",
            div { class: "hero-inner",
                h1 { "Design Your Dream Space" }
                p { "AI-powered interior design, personalized for you. See your room's potential in seconds." }
            }
        }

        div { class: "designer-card", {panel} }
    }
}

#[component]
fn LoadingPanel() -> Element {
    rsx! {
        div { class: "panel panel-loading",
            div { class: "spinner" }
            h2 { "Crafting your new look..." }
            p { "Our AI is re-imagining your space. This can take a moment." }
        }
    }
}

#[component]
fn ErrorPanel(message: String, on_start_over: EventHandler<()>) -> Element {
    rsx! {
        div { class: "panel panel-error",
            h2 { "An Error Occurred" }
            p { "{message}" }
            button {
                class: "btn btn-danger",
                onclick: move |_| on_start_over.call(()),
                "Start Over"
            }
        }
    }
}

#[component]
fn ResultPanel(
    session: Signal<DesignSession>,
    on_try_another: EventHandler<()>,
    on_start_over: EventHandler<()>,
) -> Element {
    let snapshot = session();
    let before = snapshot.source_image().map(|image| image.data_uri());
    let after = snapshot.result_image().map(str::to_string);
    let room_label = snapshot
        .room_type()
        .map(|room| room.label())
        .unwrap_or_default();
    let style = snapshot.style_prompt().to_string();

    rsx! {
        div { class: "panel panel-result",
            h2 { "Design Complete!" }
            p {
                "Here's the vision for your "
                span { class: "accent", "{room_label}" }
                " in a "
                span { class: "accent", "{style}" }
                " style."
            }
            div { class: "compare-grid",
                div { class: "compare-cell",
                    h3 { "Before" }
                    if let Some(src) = before {
                        img { src: "{src}", alt: "Original room" }
                    }
                }
                div { class: "compare-cell",
                    h3 { "After" }
                    if let Some(src) = after {
                        img { class: "result-image", src: "{src}", alt: "Generated interior design" }
                    }
                }
            }
            div { class: "panel-actions",
                button {
                    class: "btn btn-primary",
                    onclick: move |_| on_try_another.call(()),
                    "Try a Different Style"
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| on_start_over.call(()),
                    "Design Another Room"
                }
            }
        }
    }
}

#[component]
fn StepPanels(session: Signal<DesignSession>, on_generate: EventHandler<()>) -> Element {
    let mut session = session;
    let snapshot = session();
    let selected_room = snapshot.room_type();
    let style_prompt = snapshot.style_prompt().to_string();
    let preview = snapshot.source_image().map(|image| image.data_uri());
    let has_photo = preview.is_some();

    rsx! {
        div { class: "steps",
            div { class: "step",
                h3 {
                    span { class: "accent", "Step 1: " }
                    "Choose Your Room"
                }
                p { "Select the type of space you're redesigning." }
                div { class: "room-grid",
                    for room in RoomType::ALL {
                        button {
                            key: "{room.label()}",
                            class: if selected_room == Some(room) { "room-card selected" } else { "room-card" },
                            onclick: move |_| session.with_mut(|s| s.select_room_type(room)),
                            "{room.label()}"
                        }
                    }
                }
            }

            div { class: "step",
                h3 {
                    span { class: "accent", "Step 2: " }
                    "Upload Your Photo"
                }
                p { "Show us the current state of your room." }
                div { class: "upload-zone",
                    if let Some(src) = preview {
                        img { class: "upload-preview", src: "{src}", alt: "Room preview" }
                    } else {
                        h4 { "Click to Select Your Photo" }
                        p { class: "upload-hint", "PNG, JPG, or JPEG accepted" }
                    }
                    input {
                        r#type: "file",
                        id: "file-upload",
                        accept: "image/png, image/jpeg",
                        class: "sr-only",
                        onchange: move |ev| {
                            if let Some(file_engine) = ev.files() {
                                let Some(name) = file_engine.files().first().cloned() else {
                                    return;
                                };
                                spawn(async move {
                                    match file_engine.read_file(&name).await {
                                        Some(bytes) => {
                                            let mime = mime_from_file_name(&name);
                                            session.with_mut(|s| {
                                                s.upload_photo(SourceImage::new(bytes, mime))
                                            });
                                        }
                                        None => {
                                            tracing::warn!(file = %name, "could not read selected photo");
                                        }
                                    }
                                });
                            }
                        },
                    }
                    label { r#for: "file-upload", class: "upload-label",
                        if has_photo { "Change Photo" } else { "Select Photo" }
                    }
                }
            }

            div { class: if has_photo { "step" } else { "step step-disabled" },
                h3 {
                    span { class: "accent", "Step 3: " }
                    "Select Your Style"
                }
                p { "What aesthetic are you dreaming of?" }
                div { class: "style-chips",
                    for style in DESIGN_STYLES {
                        button {
                            key: "{style}",
                            class: if style_prompt == *style { "chip selected" } else { "chip" },
                            onclick: move |_| session.with_mut(|s| s.select_style(*style)),
                            "{style}"
                        }
                    }
                }
                input {
                    r#type: "text",
                    class: "style-input",
                    placeholder: "Or describe a custom style...",
                    value: "{style_prompt}",
                    oninput: move |ev| session.with_mut(|s| s.select_style(ev.value())),
                }
                button {
                    class: "btn btn-primary btn-generate",
                    disabled: !has_photo,
                    onclick: move |_| on_generate.call(()),
                    "Generate My New Design"
                }
            }
        }
    }
}
