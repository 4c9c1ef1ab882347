use iced::widget::{
    button, center, column, container, horizontal_space, mouse_area, opaque, row, stack, text,
    text_input,
};
use iced::{Background, Border, Color, Element, Length};

use crate::state::settings::SettingsDialog;
use crate::Message;

/// Where users can create a Gemini API key
pub const KEY_HELP_URL: &str = "https://aistudio.google.com/app/apikey";

/// The API key form shown inside the modal
pub fn view(dialog: &SettingsDialog) -> Element<'_, Message> {
    let content = column![
        row![
            text("Set API Key").size(22),
            horizontal_space(),
            button(text("✕")).on_press(Message::CloseSettings).style(button::text),
        ],
        text(
            "Configure your Google Gemini API key to use the watermark removal service. \
             The key is stored only on this computer and sent directly to Google."
        )
        .size(14),
        text("Gemini API Key").size(14),
        text_input("AIzaSy...", dialog.buffer())
            .on_input(Message::SettingsEdited)
            .on_submit(Message::SaveSettings)
            .secure(true)
            .padding(10),
        text(format!("Get a free API key at {}", KEY_HELP_URL)).size(12),
        button(text("Save settings"))
            .on_press(Message::SaveSettings)
            .padding(10)
            .width(Length::Fill),
    ]
    .spacing(14);

    container(content)
        .width(Length::Fixed(440.0))
        .padding(24)
        .style(container::rounded_box)
        .into()
}

/// Lay `content` over `base` with a dimmed backdrop; clicking the
/// backdrop emits `on_blur`.
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| container::Style {
                background: Some(Background::Color(Color {
                    a: 0.8,
                    ..Color::BLACK
                })),
                border: Border::default(),
                ..container::Style::default()
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}
