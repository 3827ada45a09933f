//! Canvas 2D backend: executes draw commands on a `CanvasRenderingContext2d`

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::commands::{Color, DrawCommand, Sprite};

fn css(color: &Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

fn load_image(src: &str) -> Option<HtmlImageElement> {
    let img = HtmlImageElement::new().ok()?;
    img.set_src(src);
    Some(img)
}

/// Canvas painter with its sprite images
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    saw_frames: [Option<HtmlImageElement>; 2],
    flag: Option<HtmlImageElement>,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            saw_frames: [load_image("assets/saw1.png"), load_image("assets/saw2.png")],
            flag: load_image("assets/flag.png"),
        })
    }

    fn image_for(&self, sprite: Sprite) -> Option<&HtmlImageElement> {
        let img = match sprite {
            Sprite::Saw { frame } => self.saw_frames[(frame % 2) as usize].as_ref(),
            Sprite::Flag => self.flag.as_ref(),
        }?;
        (img.complete() && img.natural_width() > 0).then_some(img)
    }

    pub fn paint(&self, commands: &[DrawCommand]) {
        let ctx = &self.ctx;
        let canvas_w = ctx.canvas().map(|c| c.width() as f64).unwrap_or(0.0);
        let canvas_h = ctx.canvas().map(|c| c.height() as f64).unwrap_or(0.0);

        for cmd in commands {
            match cmd {
                DrawCommand::Clear { color } => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
                }
                DrawCommand::FillRect { rect, color } => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(
                        rect.x as f64,
                        rect.y as f64,
                        rect.width as f64,
                        rect.height as f64,
                    );
                }
                DrawCommand::StrokeRect {
                    rect,
                    color,
                    line_width,
                } => {
                    ctx.set_stroke_style_str(&css(color));
                    ctx.set_line_width(*line_width as f64);
                    ctx.stroke_rect(
                        rect.x as f64,
                        rect.y as f64,
                        rect.width as f64,
                        rect.height as f64,
                    );
                }
                DrawCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill();
                }
                DrawCommand::StrokeCircle {
                    center,
                    radius,
                    color,
                    line_width,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_stroke_style_str(&css(color));
                    ctx.set_line_width(*line_width as f64);
                    ctx.stroke();
                }
                DrawCommand::FillRadialGradient {
                    center,
                    radius,
                    stops,
                } => {
                    let (x, y, r) = (center.x as f64, center.y as f64, *radius as f64);
                    let Ok(gradient) = ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
                        continue;
                    };
                    for (offset, color) in stops {
                        let _ = gradient.add_color_stop(*offset, &css(color));
                    }
                    ctx.begin_path();
                    let _ = ctx.arc(x, y, r, 0.0, std::f64::consts::TAU);
                    ctx.set_fill_style_canvas_gradient(&gradient);
                    ctx.fill();
                }
                DrawCommand::Sprite {
                    sprite,
                    rect,
                    fallback,
                } => match self.image_for(*sprite) {
                    Some(img) => {
                        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img,
                            rect.x as f64,
                            rect.y as f64,
                            rect.width as f64,
                            rect.height as f64,
                        );
                    }
                    None => {
                        ctx.set_fill_style_str(&css(fallback));
                        ctx.fill_rect(
                            rect.x as f64,
                            rect.y as f64,
                            rect.width as f64,
                            rect.height as f64,
                        );
                    }
                },
            }
        }
    }
}
