use iced::event::{self, Event};
use iced::widget::{
    button, canvas, column, container, horizontal_space, mouse_area, row, text, text_input, Column,
    Image, Stack,
};
use iced::{window, Alignment, Background, Border, Color, ContentFit, Element, Length};
use iced::{Subscription, Task, Theme};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod download;
mod error;
mod remote;
mod state;
mod ui;

use config::AppConfig;
use error::RemovalError;
use remote::gemini::GeminiClient;
use state::data::ProcessedImage;
use state::session::{Finish, Generation, Phase, Session, Start};
use state::settings::{Credential, Credentials, FileKeyStore, SettingsDialog, SettingsError};
use ui::comparison::Comparison;
use ui::settings_dialog;
use ui::picker;
use ui::slider::DEFAULT_PERCENT;

const PANEL: Color = Color { r: 0.12, g: 0.13, b: 0.16, a: 1.0 };
const MUTED: Color = Color { r: 0.6, g: 0.62, b: 0.66, a: 1.0 };
const DANGER: Color = Color { r: 0.94, g: 0.45, b: 0.45, a: 1.0 };
const SUCCESS: Color = Color { r: 0.29, g: 0.87, b: 0.5, a: 1.0 };

/// Main application state
struct WatermarkRemover {
    /// Startup configuration (model, endpoint, fallback key)
    config: AppConfig,
    /// Where the user key is persisted; `None` without a config directory
    key_store: Option<FileKeyStore>,
    credentials: Credentials,
    settings: SettingsDialog,
    /// The current upload and its processing state
    session: Session,
    /// Comparison divider position in [0, 100]
    slider: f32,
    /// Blocking notice (rejected file, failed save)
    notice: Option<String>,
    /// A file is being dragged over the window
    hovering_file: bool,
    /// The current drop gesture already delivered its first file
    drop_taken: bool,
    /// Where the last download went
    saved_to: Option<PathBuf>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the drop zone
    OpenPicker,
    FileHovered,
    FileHoverLeft,
    FileDropped(PathBuf),
    DismissNotice,
    InstructionChanged(String),
    /// Start (or retry) watermark removal
    Process,
    /// Remote call finished for the given session
    Processed(Generation, Result<ProcessedImage, RemovalError>),
    /// Back to the upload screen
    Reset,
    /// Success → Preview to tweak the instruction
    Adjust,
    SliderMoved(f32),
    Download,
    Saved(Result<PathBuf, download::DownloadError>),
    OpenSettings,
    SettingsEdited(String),
    SaveSettings,
    CloseSettings,
}

impl WatermarkRemover {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let fallback = config.fallback_credential.clone();
        let key_store = config.settings_path.clone().map(FileKeyStore::new);

        let credentials = match &key_store {
            Some(store) => Credentials::load(store, fallback.clone()).unwrap_or_else(|e| {
                warn!("⚠️  Could not read {}: {}", store.path().display(), e);
                Credentials { user: None, fallback }
            }),
            None => {
                warn!("⚠️  {}; the API key will not be remembered", SettingsError::NoConfigDir);
                Credentials { user: None, fallback }
            }
        };

        info!(
            "🎨 Watermark Remover ready (model {}, user key: {}, fallback key: {})",
            config.model,
            credentials.has_user_key(),
            credentials.fallback.is_some()
        );

        (
            WatermarkRemover {
                config,
                key_store,
                credentials,
                settings: SettingsDialog::default(),
                session: Session::new(),
                slider: DEFAULT_PERCENT,
                notice: None,
                hovering_file: false,
                drop_taken: false,
                saved_to: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenPicker => {
                // Show the native file picker dialog
                if let Some(path) = picker::pick_with_dialog() {
                    self.offer(path);
                }
                Task::none()
            }
            Message::FileHovered => {
                self.hovering_file = true;
                self.drop_taken = false;
                Task::none()
            }
            Message::FileHoverLeft => {
                self.hovering_file = false;
                self.drop_taken = false;
                Task::none()
            }
            Message::FileDropped(path) => {
                self.hovering_file = false;
                // One event per file: only the first of a drop is considered,
                // and only while idle
                if self.drop_taken || self.session.phase() != Phase::Idle {
                    debug!("Ignoring dropped {}", path.display());
                } else {
                    self.drop_taken = true;
                    self.offer(path);
                }
                Task::none()
            }
            Message::DismissNotice => {
                self.notice = None;
                self.drop_taken = false;
                Task::none()
            }
            Message::InstructionChanged(text) => {
                self.session.set_instruction(text);
                Task::none()
            }
            Message::Process => self.process(),
            Message::Processed(ticket, result) => {
                match self.session.finish(ticket, result) {
                    Finish::Succeeded => {
                        self.slider = DEFAULT_PERCENT;
                        self.saved_to = None;
                        if let Some(processed) = self.session.processed() {
                            debug!("Result data URL is {} bytes", processed.data_url.len());
                        }
                    }
                    Finish::Failed { prompt_credential } => {
                        if prompt_credential {
                            self.settings.open(self.credentials.user.as_ref());
                        }
                    }
                    Finish::Stale => debug!(
                        "Dropped result for {:?}, session is at {:?}",
                        ticket,
                        self.session.generation()
                    ),
                }
                Task::none()
            }
            Message::Reset => {
                self.session.reset();
                self.saved_to = None;
                self.drop_taken = false;
                Task::none()
            }
            Message::Adjust => {
                self.session.adjust();
                Task::none()
            }
            Message::SliderMoved(percent) => {
                self.slider = percent;
                Task::none()
            }
            Message::Download => {
                let Some(processed) = self.session.processed() else {
                    return Task::none();
                };
                match download::choose_destination() {
                    Some(path) => Task::perform(
                        download::save(processed.bytes.clone(), path),
                        Message::Saved,
                    ),
                    None => Task::none(),
                }
            }
            Message::Saved(result) => {
                match result {
                    Ok(path) => self.saved_to = Some(path),
                    Err(e) => {
                        error!("{}", e);
                        self.notice = Some(e.to_string());
                    }
                }
                Task::none()
            }
            Message::OpenSettings => {
                self.settings.open(self.credentials.user.as_ref());
                Task::none()
            }
            Message::SettingsEdited(text) => {
                self.settings.edit(text);
                Task::none()
            }
            Message::SaveSettings => {
                let value = self.settings.save();
                match &self.key_store {
                    Some(store) => {
                        if let Err(e) = self.credentials.update(store, &value) {
                            error!("Failed to save settings: {}", e);
                            self.notice = Some(format!("Could not save the API key: {}", e));
                        }
                    }
                    None => self.credentials.user = Credential::new(&value),
                }
                Task::none()
            }
            Message::CloseSettings => {
                self.settings.close();
                Task::none()
            }
        }
    }

    /// Validate a picked or dropped file and start a session with it
    fn offer(&mut self, path: PathBuf) {
        match picker::accept(&path) {
            Ok(picked) => {
                self.notice = None;
                self.saved_to = None;
                if let Err(e) = self.session.select(picked.into_source()) {
                    debug!("{}", e);
                }
            }
            Err(rejection) => {
                warn!("🚫 {}", rejection);
                self.notice = Some(rejection.to_string());
            }
        }
    }

    /// Start or retry processing for the current image
    fn process(&mut self) -> Task<Message> {
        match self.session.start(self.credentials.effective()) {
            Start::Dispatch(job) => {
                let ticket = job.ticket;
                let api_base = self.config.api_base.clone();
                let model = self.config.model.clone();

                // A fresh client per request picks up a changed key
                Task::perform(
                    remote::remove_watermark(job, move |credential| {
                        GeminiClient::new(&api_base, &model, credential)
                    }),
                    move |result| Message::Processed(ticket, result),
                )
            }
            Start::NeedsCredential => {
                self.settings.open(self.credentials.user.as_ref());
                Task::none()
            }
            Start::Ignored => Task::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = column![self.navbar()].spacing(24);

        if let Some(notice) = &self.notice {
            content = content.push(self.notice_banner(notice));
        }

        let body = match self.session.phase() {
            Phase::Idle => self.upload_view(),
            Phase::Preview | Phase::Processing | Phase::Error => self.preview_view(),
            Phase::Success => self.comparison_view(),
        };

        content = content
            .push(container(body).width(Length::Fill).height(Length::Fill).center_x(Length::Fill))
            .push(
                container(text("Powered by Google Gemini").size(12).color(MUTED))
                    .width(Length::Fill)
                    .center_x(Length::Fill),
            );

        let page = container(content.padding(24))
            .width(Length::Fill)
            .height(Length::Fill);

        if self.settings.is_open() {
            settings_dialog::modal(page, settings_dialog::view(&self.settings), Message::CloseSettings)
        } else {
            page.into()
        }
    }

    fn navbar(&self) -> Element<Message> {
        let settings_label = if self.credentials.has_user_key() {
            "Settings"
        } else {
            "Set API Key"
        };

        row![
            mouse_area(text("AI Watermark Remover").size(24)).on_press(Message::Reset),
            horizontal_space(),
            button(text(settings_label))
                .on_press(Message::OpenSettings)
                .style(button::secondary)
                .padding(8),
        ]
        .align_y(Alignment::Center)
        .into()
    }

    fn notice_banner<'a>(&self, notice: &'a str) -> Element<'a, Message> {
        container(
            row![
                text(notice).color(DANGER),
                horizontal_space(),
                button(text("OK")).on_press(Message::DismissNotice).style(button::text),
            ]
            .align_y(Alignment::Center),
        )
        .padding(12)
        .width(Length::Fill)
        .style(|_theme| panel_style(DANGER))
        .into()
    }

    /// Idle: hero text and the drop zone
    fn upload_view(&self) -> Element<Message> {
        let border = if self.hovering_file {
            Color { r: 0.23, g: 0.51, b: 0.96, a: 1.0 }
        } else {
            Color { r: 0.25, g: 0.27, b: 0.32, a: 1.0 }
        };

        let drop_zone = mouse_area(
            container(
                column![
                    text("Click or drop an image here").size(22),
                    text("JPG, PNG and WEBP are supported. Watermarks are detected and removed automatically.")
                        .size(14)
                        .color(MUTED),
                ]
                .spacing(8)
                .align_x(Alignment::Center),
            )
            .width(Length::Fixed(640.0))
            .height(Length::Fixed(280.0))
            .center_x(Length::Fixed(640.0))
            .center_y(Length::Fixed(280.0))
            .style(move |_theme| panel_style(border)),
        )
        .on_press(Message::OpenPicker);

        column![
            text("Remove watermarks and text instantly").size(40),
            text("Upload an image and let Gemini erase watermarks, logos and timestamps, filling the background to match.")
                .size(16)
                .color(MUTED),
            drop_zone,
        ]
        .spacing(24)
        .align_x(Alignment::Center)
        .into()
    }

    /// Preview, Processing and Error: the original, the instruction field
    /// and the process button
    fn preview_view(&self) -> Element<Message> {
        let processing = self.session.phase() == Phase::Processing;

        let header = row![
            button(text("← Back to upload"))
                .on_press(Message::Reset)
                .style(button::text),
            horizontal_space(),
            text(if processing { "Gemini is thinking..." } else { "Preview" }).color(MUTED),
        ]
        .align_y(Alignment::Center);

        let mut preview = Stack::new();
        if let Some(source) = self.session.source() {
            preview = preview.push(
                Image::new(source.handle.clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill)
                    .height(Length::Fixed(420.0)),
            );
        }
        if processing {
            preview = preview.push(
                container(
                    column![
                        text("Working its magic...").size(20),
                        text("This usually takes 5-10 seconds").size(14).color(MUTED),
                    ]
                    .spacing(8)
                    .align_x(Alignment::Center),
                )
                .width(Length::Fill)
                .height(Length::Fixed(420.0))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(420.0))
                .style(|_theme| container::Style {
                    background: Some(Background::Color(Color { a: 0.6, ..Color::BLACK })),
                    ..container::Style::default()
                }),
            );
        }

        let mut content = column![header, container(preview).padding(4).style(|_theme| panel_style(PANEL))]
            .spacing(20)
            .max_width(960.0);

        if let Some(message) = self.session.error() {
            content = content.push(
                container(
                    row![
                        text(message).color(DANGER),
                        horizontal_space(),
                        button(text("Retry"))
                            .on_press(Message::Process)
                            .style(button::secondary),
                    ]
                    .align_y(Alignment::Center)
                    .spacing(12),
                )
                .padding(12)
                .width(Length::Fill)
                .style(|_theme| panel_style(DANGER)),
            );
        }

        let instruction = text_input(
            "e.g. remove the text in the top right, keep the logo in the middle...",
            self.session.instruction(),
        )
        .on_input_maybe((!processing).then_some(Message::InstructionChanged))
        .padding(12);

        let process = button(text(if processing {
            "Removing watermark..."
        } else {
            "Remove watermark"
        }))
        .on_press_maybe((!processing).then_some(Message::Process))
        .padding(14)
        .width(Length::Fill);

        content = content.push(
            column![
                text("Extra instruction (optional)").size(14),
                instruction,
                text("By default every watermark is detected and removed. Add details if the result is off.")
                    .size(12)
                    .color(MUTED),
                process,
            ]
            .spacing(10),
        );

        content.into()
    }

    /// Success: the draggable before/after comparison
    fn comparison_view(&self) -> Element<Message> {
        let (Some(source), Some(processed)) = (self.session.source(), self.session.processed())
        else {
            return column![].into();
        };

        let header = row![
            button(text("← Process a new image"))
                .on_press(Message::Reset)
                .style(button::text),
            horizontal_space(),
            text("Done").color(SUCCESS),
        ]
        .align_y(Alignment::Center);

        let comparison = canvas(Comparison::new(source, processed, self.slider))
            .width(Length::Fill)
            .height(Length::Fixed(480.0));

        let actions = row![
            button(text("Download image"))
                .on_press(Message::Download)
                .padding(12),
            button(text("Adjust instruction"))
                .on_press(Message::Adjust)
                .style(button::secondary)
                .padding(12),
        ]
        .spacing(12);

        let mut content = column![
            header,
            container(comparison).padding(4).style(|_theme| panel_style(PANEL)),
            text("Drag the slider to compare").size(13).color(MUTED),
            actions,
        ]
        .spacing(20)
        .max_width(960.0)
        .align_x(Alignment::Center);

        if let Some(path) = &self.saved_to {
            content = content.push(text(format!("Saved to {}", path.display())).size(13).color(SUCCESS));
        }

        content.into()
    }

    /// File hover and drop events from the window
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FileHoverLeft),
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Rounded panel with a colored border
fn panel_style(border: Color) -> container::Style {
    container::Style {
        background: Some(Background::Color(PANEL)),
        border: Border {
            color: border,
            width: 2.0,
            radius: 16.0.into(),
        },
        ..container::Style::default()
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env();

    iced::application(
        "AI Watermark Remover",
        WatermarkRemover::update,
        WatermarkRemover::view,
    )
    .subscription(WatermarkRemover::subscription)
    .theme(WatermarkRemover::theme)
    .centered()
    .run_with(move || WatermarkRemover::new(config))
}
