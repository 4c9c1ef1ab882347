use iced::alignment;
use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size, Theme};

use super::slider::{self, DragTracker, Pointer};
use crate::state::data::{ProcessedImage, SourceImage};
use crate::Message;

const BACKGROUND: Color = Color { r: 0.07, g: 0.08, b: 0.10, a: 1.0 };
const ACCENT: Color = Color { r: 0.15, g: 0.39, b: 0.92, a: 0.85 };
const HANDLE_RADIUS: f32 = 16.0;

/// Before/after comparison canvas
///
/// The processed image fills the background; the original is drawn on
/// top, clipped to the left `percent` of the canvas. Dragging the divider
/// emits `Message::SliderMoved`.
pub struct Comparison {
    pub original: Handle,
    pub original_size: Size,
    pub processed: Handle,
    pub processed_size: Size,
    /// Divider position in [0, 100]
    pub percent: f32,
}

impl Comparison {
    pub fn new(source: &SourceImage, processed: &ProcessedImage, percent: f32) -> Self {
        Self {
            original: source.handle.clone(),
            original_size: Size::new(source.width as f32, source.height as f32),
            processed: processed.handle.clone(),
            processed_size: Size::new(processed.width as f32, processed.height as f32),
            percent,
        }
    }
}

/// Largest rectangle with the image's aspect ratio that fits `container`,
/// centered in it.
pub fn fit_contain(image: Size, container: Rectangle) -> Rectangle {
    if image.width <= 0.0 || image.height <= 0.0 {
        return container;
    }

    let scale = (container.width / image.width).min(container.height / image.height);
    let width = image.width * scale;
    let height = image.height * scale;

    Rectangle {
        x: container.x + (container.width - width) / 2.0,
        y: container.y + (container.height - height) / 2.0,
        width,
        height,
    }
}

impl Program<Message> for Comparison {
    type State = DragTracker;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Press on the divider - start dragging
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_over(bounds) {
                    if slider::on_divider(pos.x, bounds.x, bounds.width, self.percent)
                        && state.begin(Pointer::Mouse)
                    {
                        return (canvas::event::Status::Captured, None);
                    }
                }
            }

            // Canvas events keep arriving after the cursor leaves the bounds,
            // so a fast drag keeps tracking
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if let Some(percent) = state.track(Pointer::Mouse, position.x, bounds.x, bounds.width) {
                    return (canvas::event::Status::Captured, Some(Message::SliderMoved(percent)));
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.end(Pointer::Mouse) {
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if bounds.contains(position)
                    && slider::on_divider(position.x, bounds.x, bounds.width, self.percent)
                    && state.begin(Pointer::Finger(id.0))
                {
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                if let Some(percent) =
                    state.track(Pointer::Finger(id.0), position.x, bounds.x, bounds.width)
                {
                    return (canvas::event::Status::Captured, Some(Message::SliderMoved(percent)));
                }
            }

            canvas::Event::Touch(touch::Event::FingerLifted { id, .. })
            | canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => {
                if state.end(Pointer::Finger(id.0)) {
                    return (canvas::event::Status::Captured, None);
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let area = Rectangle::with_size(bounds.size());

        frame.fill_rectangle(Point::ORIGIN, area.size(), BACKGROUND);

        // Background: processed result
        frame.draw_image(
            fit_contain(self.processed_size, area),
            canvas::Image::new(self.processed.clone()),
        );
        label(&mut frame, "Cleaned", Point::new(area.width - 12.0, 12.0), ACCENT, alignment::Horizontal::Right);

        // Foreground: original, clipped at the divider
        let split = slider::divider_x(0.0, area.width, self.percent);
        if split > 0.0 {
            let original_rect = fit_contain(self.original_size, area);
            let clip = Rectangle::new(Point::ORIGIN, Size::new(split, area.height));

            frame.with_clip(clip, |frame| {
                frame.fill_rectangle(Point::ORIGIN, clip.size(), BACKGROUND);
                frame.draw_image(original_rect, canvas::Image::new(self.original.clone()));
                label(frame, "Original", Point::new(12.0, 12.0), Color::from_rgba(0.0, 0.0, 0.0, 0.6), alignment::Horizontal::Left);
            });
        }

        // Divider and grab handle
        frame.fill_rectangle(Point::new(split - 1.5, 0.0), Size::new(3.0, area.height), Color::WHITE);

        let center = Point::new(split, area.height / 2.0);
        frame.fill(&Path::circle(center, HANDLE_RADIUS), Color::WHITE);

        let chevrons = Path::new(|p| {
            p.move_to(Point::new(center.x - 3.0, center.y - 5.0));
            p.line_to(Point::new(center.x - 8.0, center.y));
            p.line_to(Point::new(center.x - 3.0, center.y + 5.0));
            p.move_to(Point::new(center.x + 3.0, center.y - 5.0));
            p.line_to(Point::new(center.x + 8.0, center.y));
            p.line_to(Point::new(center.x + 3.0, center.y + 5.0));
        });
        frame.stroke(&chevrons, Stroke::default().with_color(ACCENT).with_width(2.0));

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging() {
            return mouse::Interaction::ResizingHorizontally;
        }

        match cursor.position_over(bounds) {
            Some(pos) if slider::on_divider(pos.x, bounds.x, bounds.width, self.percent) => {
                mouse::Interaction::ResizingHorizontally
            }
            _ => mouse::Interaction::default(),
        }
    }
}

/// Small badge in a corner of the comparison
fn label(
    frame: &mut canvas::Frame,
    content: &str,
    anchor: Point,
    background: Color,
    align: alignment::Horizontal,
) {
    let width = content.len() as f32 * 7.5 + 20.0;
    let left = match align {
        alignment::Horizontal::Right => anchor.x - width,
        alignment::Horizontal::Center => anchor.x - width / 2.0,
        alignment::Horizontal::Left => anchor.x,
    };

    frame.fill(
        &Path::rounded_rectangle(Point::new(left, anchor.y), Size::new(width, 24.0), 12.0.into()),
        background,
    );
    frame.fill_text(canvas::Text {
        content: content.to_string(),
        position: Point::new(left + width / 2.0, anchor.y + 12.0),
        color: Color::WHITE,
        size: Pixels(12.0),
        horizontal_alignment: alignment::Horizontal::Center,
        vertical_alignment: alignment::Vertical::Center,
        ..canvas::Text::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_contain_wide_image() {
        let container = Rectangle::new(Point::ORIGIN, Size::new(800.0, 400.0));
        let fitted = fit_contain(Size::new(1600.0, 400.0), container);
        assert_eq!(fitted, Rectangle::new(Point::new(0.0, 100.0), Size::new(800.0, 200.0)));
    }

    #[test]
    fn test_fit_contain_tall_image() {
        let container = Rectangle::new(Point::new(10.0, 20.0), Size::new(800.0, 400.0));
        let fitted = fit_contain(Size::new(100.0, 200.0), container);
        assert_eq!(fitted, Rectangle::new(Point::new(310.0, 20.0), Size::new(200.0, 400.0)));
    }

    #[test]
    fn test_fit_contain_degenerate_image() {
        let container = Rectangle::new(Point::ORIGIN, Size::new(300.0, 300.0));
        assert_eq!(fit_contain(Size::new(0.0, 10.0), container), container);
    }
}
