use crate::app::tools::text::{line_advance, text_width, Canvas};
use crate::app::{HudPanel, HudState};

const PANEL_TITLE_SCALE: i32 = 5;
const PANEL_LINE_SCALE: i32 = 3;
const HINT_SCALE: i32 = 3;
const PROMPT_SCALE: i32 = 3;
const PANEL_INSET: i32 = 24;
const HINT_BOTTOM_MARGIN: i32 = 48;
const PROMPT_OFFSET_Y: i32 = 40;
const PANEL_BG: [u8; 4] = [0, 0, 0, 190];
const PANEL_BORDER: [u8; 4] = [120, 24, 24, 255];
const TITLE_COLOR: [u8; 4] = [230, 40, 40, 255];
const LINE_COLOR: [u8; 4] = [220, 220, 220, 255];
const HINT_BG: [u8; 4] = [0, 0, 0, 160];
const HINT_COLOR: [u8; 4] = [240, 240, 240, 255];
const PROMPT_COLOR: [u8; 4] = [255, 214, 90, 255];
const VIGNETTE_BANDS: i32 = 12;
const VIGNETTE_MAX_ALPHA: f32 = 170.0;

pub(super) fn draw_hud(canvas: &mut Canvas<'_>, hud: &HudState) {
    draw_vignette(canvas, hud.vignette);
    if let Some(prompt) = hud.prompt.as_deref() {
        let x = (canvas.width() - text_width(prompt, PROMPT_SCALE)) / 2;
        let y = canvas.height() / 2 + PROMPT_OFFSET_Y;
        canvas.text(x, y, prompt, PROMPT_SCALE, PROMPT_COLOR);
    }
    if let Some(hint) = hud.hint.as_deref() {
        draw_hint(canvas, hint);
    }
    if let Some(panel) = hud.panel.as_ref() {
        draw_panel(canvas, panel);
    }
}

fn draw_hint(canvas: &mut Canvas<'_>, hint: &str) {
    let w = text_width(hint, HINT_SCALE);
    let h = line_advance(HINT_SCALE);
    let x = (canvas.width() - w) / 2;
    let y = canvas.height() - HINT_BOTTOM_MARGIN - h;
    canvas.fill_rect(x - 8, y - 6, w + 16, h + 6, HINT_BG);
    canvas.text(x, y, hint, HINT_SCALE, HINT_COLOR);
}

fn draw_panel(canvas: &mut Canvas<'_>, panel: &HudPanel) {
    let title_w = text_width(&panel.title, PANEL_TITLE_SCALE);
    let body_w = panel
        .lines
        .iter()
        .map(|line| text_width(line, PANEL_LINE_SCALE))
        .max()
        .unwrap_or(0);
    let content_w = title_w.max(body_w);
    let content_h = line_advance(PANEL_TITLE_SCALE)
        + line_advance(PANEL_LINE_SCALE) * (panel.lines.len() as i32 + 1);
    let panel_w = content_w + PANEL_INSET * 2;
    let panel_h = content_h + PANEL_INSET * 2;
    let left = (canvas.width() - panel_w) / 2;
    let top = (canvas.height() - panel_h) / 2;

    canvas.fill_rect(left, top, panel_w, panel_h, PANEL_BG);
    canvas.rect_outline(left, top, panel_w, panel_h, PANEL_BORDER);

    let mut y = top + PANEL_INSET;
    canvas.text(
        (canvas.width() - title_w) / 2,
        y,
        &panel.title,
        PANEL_TITLE_SCALE,
        TITLE_COLOR,
    );
    y += line_advance(PANEL_TITLE_SCALE) + line_advance(PANEL_LINE_SCALE);
    for line in &panel.lines {
        let x = (canvas.width() - text_width(line, PANEL_LINE_SCALE)) / 2;
        canvas.text(x, y, line, PANEL_LINE_SCALE, LINE_COLOR);
        y += line_advance(PANEL_LINE_SCALE);
    }
}

/// Red border that thickens and darkens as `intensity` approaches 1.
fn draw_vignette(canvas: &mut Canvas<'_>, intensity: f32) {
    if !intensity.is_finite() || intensity <= 0.0 {
        return;
    }
    let intensity = intensity.min(1.0);
    let depth = (canvas.width().min(canvas.height()) as f32 * 0.18 * intensity) as i32;
    if depth <= 0 {
        return;
    }
    let band = (depth / VIGNETTE_BANDS).max(1);
    let (w, h) = (canvas.width(), canvas.height());
    let mut inset = 0;
    let mut step = 0;
    while inset < depth && step < VIGNETTE_BANDS {
        let falloff = 1.0 - step as f32 / VIGNETTE_BANDS as f32;
        let alpha = (VIGNETTE_MAX_ALPHA * intensity * falloff) as u8;
        let color = [150, 0, 0, alpha];
        canvas.fill_rect(inset, inset, w - inset * 2, band, color);
        canvas.fill_rect(inset, h - inset - band, w - inset * 2, band, color);
        canvas.fill_rect(inset, inset + band, band, h - (inset + band) * 2, color);
        canvas.fill_rect(w - inset - band, inset + band, band, h - (inset + band) * 2, color);
        inset += band;
        step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_at(frame: &[u8], width: u32, x: u32, y: u32) -> u8 {
        frame[((y * width + x) * 4) as usize]
    }

    #[test]
    fn vignette_only_tints_when_intensity_positive() {
        let (w, h) = (200u32, 100u32);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        {
            let mut canvas = Canvas::new(&mut frame, w, h);
            canvas.clear([0, 0, 0, 255]);
            draw_vignette(&mut canvas, 0.0);
        }
        assert_eq!(red_at(&frame, w, 0, 0), 0);

        {
            let mut canvas = Canvas::new(&mut frame, w, h);
            draw_vignette(&mut canvas, 1.0);
        }
        assert!(red_at(&frame, w, 0, 0) > 0);
        assert_eq!(red_at(&frame, w, w / 2, h / 2), 0);
    }

    #[test]
    fn hud_with_every_element_draws_safely_on_small_viewport() {
        let mut frame = vec![0u8; 40 * 30 * 4];
        let mut canvas = Canvas::new(&mut frame, 40, 30);
        let hud = HudState {
            panel: Some(HudPanel {
                title: "GAME OVER".to_string(),
                lines: vec!["PRESS R TO RESTART".to_string()],
            }),
            hint: Some("Wrong choice!".to_string()),
            prompt: Some("DOOR 2 - [E] OPEN".to_string()),
            vignette: 0.7,
        };
        draw_hud(&mut canvas, &hud);
    }
}
