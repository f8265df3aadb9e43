use crate::app::LoopMetricsSnapshot;

use super::text::{line_advance, text_width, Canvas};

const TEXT_SCALE: i32 = 2;
const OVERLAY_PADDING: i32 = 12;
const PANEL_INSET: i32 = 6;
const TEXT_PRIMARY: [u8; 4] = [236, 240, 246, 255];
const TEXT_DIM: [u8; 4] = [150, 168, 190, 255];
const PANEL_BG: [u8; 4] = [8, 10, 14, 200];
const PANEL_BORDER: [u8; 4] = [84, 96, 116, 255];
const PERF_SECTION_LABEL: &str = "PERF";

#[derive(Debug, Clone, Default)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub slow_frame_delay_ms: u64,
    pub entity_count: usize,
    pub scene_title: Option<String>,
    pub scene_lines: Vec<String>,
}

pub(crate) fn draw_overlay(canvas: &mut Canvas<'_>, data: &OverlayData) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let widest = lines
        .iter()
        .map(|line| text_width(line, TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let panel_w = widest + PANEL_INSET * 2;
    let panel_h = lines.len() as i32 * line_advance(TEXT_SCALE) + PANEL_INSET * 2;
    let left = OVERLAY_PADDING - PANEL_INSET;
    let top = OVERLAY_PADDING - PANEL_INSET;
    canvas.fill_rect(left, top, panel_w, panel_h, PANEL_BG);
    canvas.rect_outline(left, top, panel_w, panel_h, PANEL_BORDER);

    let mut y = OVERLAY_PADDING;
    for line in &lines {
        canvas.text(OVERLAY_PADDING, y, line, TEXT_SCALE, line_color(data, line));
        y += line_advance(TEXT_SCALE);
    }
}

fn line_color(data: &OverlayData, line: &str) -> [u8; 4] {
    let is_section = line == PERF_SECTION_LABEL || data.scene_title.as_deref() == Some(line);
    if is_section {
        TEXT_DIM
    } else {
        TEXT_PRIMARY
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        PERF_SECTION_LABEL.to_string(),
        format_fps_line(data.metrics.fps, data.render_fps_cap, data.slow_frame_delay_ms),
        format!("TPS: {:.1}", data.metrics.tps),
        format!("FRAME: {:.2} MS", data.metrics.frame_time_ms),
        format!("DROPPED: {}", data.metrics.dropped_ticks),
        format!("ENTITIES: {}", data.entity_count),
    ];

    if let Some(title) = data.scene_title.as_ref() {
        lines.push(String::new());
        lines.push(title.clone());
    }
    lines.extend(data.scene_lines.iter().cloned());
    lines
}

fn format_fps_line(current_fps: f32, cap: Option<u32>, slow_frame_delay_ms: u64) -> String {
    let cap_text = match cap {
        Some(value) => value.to_string(),
        None => "INF".to_string(),
    };
    if slow_frame_delay_ms == 0 {
        format!("FPS: {:.0} / {}", current_fps, cap_text)
    } else {
        format!(
            "FPS: {:.0} / {} +{}MS",
            current_fps, cap_text, slow_frame_delay_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_line_shows_cap_and_debug_delay() {
        assert_eq!(format_fps_line(59.6, Some(60), 0), "FPS: 60 / 60");
        assert_eq!(format_fps_line(30.0, None, 8), "FPS: 30 / INF +8MS");
    }

    #[test]
    fn scene_lines_follow_perf_block() {
        let data = OverlayData {
            scene_title: Some("AWAKENED ROOM".to_string()),
            scene_lines: vec!["PHASE: CORRIDOR".to_string()],
            ..OverlayData::default()
        };
        let lines = build_overlay_lines(&data);
        assert_eq!(lines[0], PERF_SECTION_LABEL);
        assert_eq!(lines[lines.len() - 2], "AWAKENED ROOM");
        assert_eq!(lines[lines.len() - 1], "PHASE: CORRIDOR");
    }

    #[test]
    fn draw_overlay_paints_backing_panel() {
        let width = 320u32;
        let height = 240u32;
        let mut frame = vec![0u8; (width * height * 4) as usize];
        {
            let mut canvas = Canvas::new(&mut frame, width, height);
            draw_overlay(&mut canvas, &OverlayData::default());
        }
        let offset = ((OVERLAY_PADDING - PANEL_INSET) as u32 * width
            + (OVERLAY_PADDING - PANEL_INSET) as u32)
            * 4;
        assert_eq!(frame[offset as usize..offset as usize + 4], PANEL_BORDER);
    }

    #[test]
    fn draw_overlay_on_tiny_viewport_is_safe() {
        let mut frame = vec![0u8; 3 * 2 * 4];
        let mut canvas = Canvas::new(&mut frame, 3, 2);
        draw_overlay(&mut canvas, &OverlayData::default());
    }
}
