use clap::Parser;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, pick_list, row, scrollable, slider, text, Image};
use iced::{Alignment, Element, Length, Task, Theme};
use tracing::{error, info, warn};

mod config;
mod error;
mod logger;
mod overlay;
mod state;
mod ui;

use config::{Args, ReviewConfig};
use error::{Result, ReviewError};
use overlay::BlendWeight;
use state::catalog::Catalog;
use state::data::{ClassificationEntry, ImageRecord, Label};
use state::ledger::ReviewLedger;
use state::session::ReviewSession;

/// What the preview area shows for the current image
#[derive(Debug, Clone)]
enum Preview {
    /// Nothing to show (empty catalog)
    Empty,
    /// The composite, ready to upload
    Overlay(Handle),
    /// The mask file is missing; the rest of the session still works
    MissingMask(String),
    /// Decode or compositing failure for this image
    Failed(String),
}

/// Outcome of the last classification, shown under the buttons
#[derive(Debug, Clone, PartialEq)]
enum Status {
    Saved(String),
    Failed(String),
}

/// Main application state
enum ReviewApp {
    /// Startup succeeded
    Reviewing(Box<Review>),
    /// Startup failed (missing directory, bad config); nothing else runs
    Halted(String),
}

/// An open review over one image/mask directory pair
struct Review {
    config: ReviewConfig,
    catalog: Catalog,
    ledger: ReviewLedger,
    session: ReviewSession,
    preview: Preview,
    /// Judgment currently stored for the displayed image
    current_label: Option<Label>,
    /// Full ledger contents as of the last read
    entries: Vec<ClassificationEntry>,
    status: Option<Status>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User picked an image from the list
    Select(ImageRecord),
    /// Carousel navigation
    Previous,
    Next,
    /// Blend weight slider moved
    WeightChanged(f32),
    /// User clicked "Boa" or "Ruim"
    Classify(Label),
}

impl ReviewApp {
    /// Create a new instance of the application
    fn new(args: &Args) -> (Self, Task<Message>) {
        (Self::open(ReviewConfig::from_args(args)), Task::none())
    }

    fn open(config: Result<ReviewConfig>) -> Self {
        match config.and_then(Review::open) {
            Ok(review) => ReviewApp::Reviewing(Box::new(review)),
            Err(e) => {
                error!("Cannot start review: {}", e);
                ReviewApp::Halted(e.to_string())
            }
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let ReviewApp::Reviewing(review) = self else {
            return Task::none();
        };

        match message {
            Message::Select(record) => {
                if let Some(index) = review.catalog.position(&record.id) {
                    review.session.cursor.select(index);
                    review.refresh_preview();
                }
            }
            Message::Previous => {
                review.session.cursor.previous();
                review.refresh_preview();
            }
            Message::Next => {
                review.session.cursor.next();
                review.refresh_preview();
            }
            Message::WeightChanged(value) => match BlendWeight::new(value.clamp(0.0, 1.0)) {
                Ok(weight) => {
                    review.session.weight = weight;
                    review.refresh_preview();
                }
                Err(e) => warn!("Ignoring slider value: {}", e),
            },
            Message::Classify(label) => review.classify(label),
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match self {
            ReviewApp::Reviewing(review) => review.view(),
            ReviewApp::Halted(reason) => column![
                text("🔍 Segmentation Review").size(32),
                text(format!("🚨 {}", reason)).color(ui::error_color()),
                text("Check the configured directories and restart.").size(14)
            ]
            .spacing(20)
            .into(),
        };

        container(scrollable(container(content).padding(30).width(Length::Fill)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl Review {
    /// Check the directories, scan the catalog and render the first image
    fn open(config: ReviewConfig) -> Result<Self> {
        let catalog = Catalog::open(
            &config.image_dir,
            &config.mask_dir,
            &config.image_extension,
            &config.mask_extension,
        )?;
        if catalog.is_empty() {
            warn!(
                "No .{} images in {}",
                config.image_extension,
                config.image_dir.display()
            );
        }

        let ledger = ReviewLedger::new(config.ledger_path.clone());
        let session = ReviewSession::new(catalog.len(), config.initial_weight()?);
        let entries = ledger.list_all();

        info!(
            "Reviewing {} images, {} classifications in {}",
            catalog.len(),
            entries.len(),
            ledger.path().display()
        );

        let mut review = Review {
            config,
            catalog,
            ledger,
            session,
            preview: Preview::Empty,
            current_label: None,
            entries,
            status: None,
        };
        review.refresh_preview();
        Ok(review)
    }

    fn current(&self) -> Option<&ImageRecord> {
        self.catalog.get(self.session.cursor.index())
    }

    /// Re-render the overlay of the current image at the current weight
    fn refresh_preview(&mut self) {
        self.status = None;

        let Some(record) = self.current() else {
            self.preview = Preview::Empty;
            self.current_label = None;
            return;
        };

        let preview = match overlay::render(record, self.session.weight) {
            Ok(composite) => Preview::Overlay(ui::overlay_handle(composite)),
            Err(ReviewError::MissingMask(path)) => {
                warn!("No mask for {}: {}", record.stem, path.display());
                Preview::MissingMask(format!("⚠️ File not found: {}", path.display()))
            }
            Err(e) => {
                error!("Cannot render {}: {}", record.id, e);
                Preview::Failed(format!("❌ Cannot render {}: {}", record.id, e))
            }
        };
        let current_label = self.ledger.label_for(&record.id);

        self.preview = preview;
        self.current_label = current_label;
    }

    /// Save a judgment for the current image and reload the ledger listing
    fn classify(&mut self, label: Label) {
        let Some(id) = self.current().map(|record| record.id.clone()) else {
            return;
        };

        self.status = Some(match self.ledger.classify(&id, label) {
            Ok(()) => {
                self.current_label = Some(label);
                Status::Saved(format!("✅ Classification '{}' saved for {}!", label, id))
            }
            Err(e) => {
                error!("Cannot save classification for {}: {}", id, e);
                Status::Failed(format!("❌ Could not save classification for {}: {}", id, e))
            }
        });
        self.entries = self.ledger.list_all();
    }

    fn progress_line(&self) -> String {
        format!(
            "Image {} of {}  ·  {} classified  ·  current: {}",
            self.session.cursor.index() + 1,
            self.catalog.len(),
            self.entries.len(),
            self.current_label.map_or("none", Label::as_str)
        )
    }

    fn view(&self) -> Element<'_, Message> {
        let title = text("🔍 Segmentation Review").size(32);

        let Some(record) = self.current() else {
            return column![
                title,
                text(format!(
                    "No .{} images found in {}",
                    self.config.image_extension,
                    self.config.image_dir.display()
                ))
                .color(ui::warning_color())
            ]
            .spacing(20)
            .into();
        };

        let navigation = row![
            button("⬅ Previous").on_press(Message::Previous),
            pick_list(self.catalog.records(), Some(record), Message::Select).width(Length::Fill),
            button("Next ➡").on_press(Message::Next)
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let progress = text(self.progress_line()).size(14);

        let weight = self.session.weight.value();
        let weight_control = row![
            text("Mask weight").size(14),
            slider(0.0..=1.0, weight, Message::WeightChanged).step(self.config.weight_step),
            text(format!("{:.2}", weight)).size(14)
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let preview: Element<Message> = match &self.preview {
            Preview::Overlay(handle) => {
                let buttons = row![
                    button(text(format!("✅ {}", Label::Accepted)))
                        .on_press(Message::Classify(Label::Accepted))
                        .padding(10),
                    button(text(format!("❌ {}", Label::Rejected)))
                        .on_press(Message::Classify(Label::Rejected))
                        .padding(10)
                ]
                .spacing(20);

                column![
                    Image::new(handle.clone()).width(Length::Fixed(self.config.preview_width)),
                    text(format!("Overlay - {}", record.id)).size(14),
                    buttons
                ]
                .spacing(10)
                .align_x(Alignment::Center)
                .into()
            }
            Preview::MissingMask(message) => {
                text(message.as_str()).color(ui::warning_color()).into()
            }
            Preview::Failed(message) => text(message.as_str()).color(ui::error_color()).into(),
            Preview::Empty => text("").into(),
        };

        let status: Element<Message> = match &self.status {
            Some(Status::Saved(message)) => text(message.as_str()).color(ui::success_color()).into(),
            Some(Status::Failed(message)) => text(message.as_str()).color(ui::error_color()).into(),
            None => text("").into(),
        };

        column![
            title,
            navigation,
            progress,
            weight_control,
            container(preview).center_x(Length::Fill),
            status,
            text("Classifications").size(20),
            ui::ledger_table::view(&self.entries),
            text("Use the slider to adjust the mask weight and classify the image.").size(14)
        ]
        .spacing(16)
        .into()
    }
}

fn main() -> iced::Result {
    logger::init();

    let args = Args::parse();
    info!("Starting mask review...");

    iced::application("Segmentation Review", ReviewApp::update, ReviewApp::view)
        .theme(ReviewApp::theme)
        .centered()
        .run_with(move || ReviewApp::new(&args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma, RgbImage};
    use std::path::Path;

    struct Fixture {
        images: tempfile::TempDir,
        masks: tempfile::TempDir,
        out: tempfile::TempDir,
    }

    impl Fixture {
        /// a.jpg and b.jpg, only a.png
        fn new() -> Self {
            let images = tempfile::tempdir().unwrap();
            let masks = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();

            let black = RgbImage::new(8, 8);
            black.save(images.path().join("a.jpg")).unwrap();
            black.save(images.path().join("b.jpg")).unwrap();
            GrayImage::from_pixel(2, 2, Luma([255]))
                .save(masks.path().join("a.png"))
                .unwrap();

            Fixture { images, masks, out }
        }

        fn config(&self) -> ReviewConfig {
            ReviewConfig {
                image_dir: self.images.path().to_path_buf(),
                mask_dir: self.masks.path().to_path_buf(),
                ledger_path: self.out.path().join("classificacoes.csv"),
                ..ReviewConfig::default()
            }
        }

        fn ledger_path(&self) -> std::path::PathBuf {
            self.out.path().join("classificacoes.csv")
        }
    }

    fn reviewing(app: &ReviewApp) -> &Review {
        match app {
            ReviewApp::Reviewing(review) => review,
            ReviewApp::Halted(reason) => panic!("review halted: {}", reason),
        }
    }

    #[test]
    fn test_missing_directory_halts() {
        let fixture = Fixture::new();
        let config = ReviewConfig {
            mask_dir: fixture.masks.path().join("missing"),
            ..fixture.config()
        };

        let app = ReviewApp::open(Ok(config));

        assert!(matches!(app, ReviewApp::Halted(ref reason) if reason.contains("missing")));
    }

    #[test]
    fn test_bad_config_halts() {
        let app = ReviewApp::open(Err(ReviewError::InvalidBlendWeight(3.0)));
        assert!(matches!(app, ReviewApp::Halted(_)));
    }

    #[test]
    fn test_carousel_and_missing_mask() {
        let fixture = Fixture::new();
        let mut app = ReviewApp::open(Ok(fixture.config()));

        assert!(matches!(reviewing(&app).preview, Preview::Overlay(_)));

        let _ = app.update(Message::Next);
        let review = reviewing(&app);
        assert_eq!(review.current().unwrap().id, "b.jpg");
        assert!(matches!(review.preview, Preview::MissingMask(ref m) if m.contains("b.png")));

        let _ = app.update(Message::Next);
        assert_eq!(reviewing(&app).session.cursor.index(), 1);

        let _ = app.update(Message::Previous);
        let _ = app.update(Message::Previous);
        assert_eq!(reviewing(&app).session.cursor.index(), 0);
    }

    #[test]
    fn test_progress_line_names_current_label() {
        let fixture = Fixture::new();
        let mut app = ReviewApp::open(Ok(fixture.config()));

        assert!(reviewing(&app).progress_line().ends_with("current: none"));

        let _ = app.update(Message::Classify(Label::Accepted));
        let line = reviewing(&app).progress_line();
        assert!(line.starts_with("Image 1 of 2"));
        assert!(line.contains("1 classified"));
        assert!(line.ends_with("current: Boa"));
    }

    #[test]
    fn test_direct_selection() {
        let fixture = Fixture::new();
        let mut app = ReviewApp::open(Ok(fixture.config()));
        let b = reviewing(&app).catalog.get(1).unwrap().clone();

        let _ = app.update(Message::Select(b));

        assert_eq!(reviewing(&app).current().unwrap().id, "b.jpg");
    }

    #[test]
    fn test_classification_upserts_and_lists() {
        let fixture = Fixture::new();
        let mut app = ReviewApp::open(Ok(fixture.config()));

        let _ = app.update(Message::Classify(Label::Accepted));
        let _ = app.update(Message::Classify(Label::Rejected));

        let review = reviewing(&app);
        assert_eq!(
            review.entries,
            vec![ClassificationEntry::new("a.jpg", Label::Rejected)]
        );
        assert_eq!(review.current_label, Some(Label::Rejected));
        assert!(matches!(review.status, Some(Status::Saved(ref m)) if m.contains("Ruim")));
        assert!(fixture.ledger_path().is_file());

        // Navigation clears the message but keeps the ledger
        let _ = app.update(Message::Next);
        let review = reviewing(&app);
        assert_eq!(review.status, None);
        assert_eq!(review.current_label, None);
        assert_eq!(review.entries.len(), 1);
    }

    #[test]
    fn test_existing_ledger_is_shown_on_startup() {
        let fixture = Fixture::new();
        ReviewLedger::new(fixture.ledger_path())
            .classify("b.jpg", Label::Accepted)
            .unwrap();

        let mut app = ReviewApp::open(Ok(fixture.config()));
        let _ = app.update(Message::Next);

        let review = reviewing(&app);
        assert_eq!(review.entries.len(), 1);
        assert_eq!(review.current_label, Some(Label::Accepted));
    }

    #[test]
    fn test_weight_slider() {
        let fixture = Fixture::new();
        let mut app = ReviewApp::open(Ok(fixture.config()));

        let _ = app.update(Message::WeightChanged(0.25));
        assert_eq!(reviewing(&app).session.weight.value(), 0.25);

        let _ = app.update(Message::WeightChanged(1.0000001));
        assert_eq!(reviewing(&app).session.weight.value(), 1.0);
    }

    #[test]
    fn test_empty_catalog_is_not_fatal() {
        let fixture = Fixture::new();
        let config = ReviewConfig {
            image_dir: fixture.masks.path().to_path_buf(),
            ..fixture.config()
        };

        let mut app = ReviewApp::open(Ok(config));
        let _ = app.update(Message::Next);
        let _ = app.update(Message::Classify(Label::Accepted));

        let review = reviewing(&app);
        assert!(review.catalog.is_empty());
        assert!(matches!(review.preview, Preview::Empty));
        assert!(!Path::new(&review.config.ledger_path).exists());
    }
}
