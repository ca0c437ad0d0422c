//! 2D canvas backend

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::{self, DrawCmd};
use crate::engine::Snapshot;
use crate::sim::PlayField;
use crate::tuning::Tuning;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the element's CSS size.
    /// Returns the play field in CSS pixels.
    pub fn resize(&self, dpr: f64) -> PlayField {
        let w = self.canvas.client_width().max(1);
        let h = self.canvas.client_height().max(1);
        self.canvas.set_width((w as f64 * dpr) as u32);
        self.canvas.set_height((h as f64 * dpr) as u32);
        if let Err(e) = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
            log::warn!("Canvas transform failed: {:?}", e);
        }
        PlayField::new(w as f32, h as f32)
    }

    pub fn render(&self, snapshot: &Snapshot, tuning: &Tuning, field: PlayField) {
        for cmd in scene::build(snapshot, tuning, field) {
            match cmd {
                DrawCmd::Rect { rect, color } => {
                    self.ctx.set_fill_style_str(color);
                    let size = rect.max - rect.min;
                    self.ctx.fill_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        size.x as f64,
                        size.y as f64,
                    );
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                } => {
                    self.ctx.set_fill_style_str(color);
                    self.ctx.begin_path();
                    if self
                        .ctx
                        .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
                        .is_ok()
                    {
                        self.ctx.fill();
                    }
                }
            }
        }
    }
}
