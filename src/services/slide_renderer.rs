//! 幻灯片渲染服务 - 业务能力层
//!
//! 只负责"一张幻灯片 → 一张 PNG"能力，不关心整组流程。
//!
//! 画面布局：白底 1600×900，标题靠上，强调色横条在标题下方，
//! 要点逐行排布。字体按候选列表探测，全部缺失时退化为
//! 无文字的空白版式（文件仍然产出，渲染绝不报错）。

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::slide::Slide;

/// 画布尺寸（固定）
const SLIDE_WIDTH: u32 = 1600;
const SLIDE_HEIGHT: u32 = 900;

/// 文字版式常量
const TITLE_X: i32 = 80;
const TITLE_Y: i32 = 80;
const TITLE_SCALE: f32 = 60.0;
const ACCENT_BAR_Y: i32 = 170;
const ACCENT_BAR_WIDTH: u32 = 240;
const ACCENT_BAR_HEIGHT: u32 = 8;
const BULLET_X: i32 = 120;
const BULLET_START_Y: i32 = 220;
const BULLET_LINE_HEIGHT: i32 = 70;
const BULLET_SCALE: f32 = 42.0;

/// 字体候选路径（优先无衬线，等宽兜底）
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 幻灯片渲染服务
pub struct SlideRenderer {
    font: Option<FontVec>,
}

impl SlideRenderer {
    /// 创建新的渲染服务
    ///
    /// 配置里给了字体路径就优先用它，否则按候选列表探测。
    pub fn new(config: &Config) -> Self {
        let explicit = if config.slide_font_path.is_empty() {
            None
        } else {
            Some(config.slide_font_path.as_str())
        };

        let font = load_font(explicit);
        if font.is_none() {
            warn!("⚠️ 未找到可用字体，幻灯片将以无文字版式渲染");
        }

        Self { font }
    }

    /// 渲染单张幻灯片到目标路径
    ///
    /// 可选字段缺失（零要点、无强调色）一律容忍，仍产出有效图片。
    pub fn render(&self, slide: &Slide, target: &Path) -> AppResult<()> {
        let mut img = RgbImage::from_pixel(SLIDE_WIDTH, SLIDE_HEIGHT, Rgb([255, 255, 255]));

        // 强调色横条（非法或缺失的色值跳过）
        if let Some([r, g, b]) = slide.accent_rgb() {
            draw_filled_rect_mut(
                &mut img,
                Rect::at(TITLE_X, ACCENT_BAR_Y).of_size(ACCENT_BAR_WIDTH, ACCENT_BAR_HEIGHT),
                Rgb([r, g, b]),
            );
        }

        if let Some(font) = &self.font {
            let black = Rgb([0u8, 0u8, 0u8]);

            draw_text_mut(
                &mut img,
                black,
                TITLE_X,
                TITLE_Y,
                PxScale::from(TITLE_SCALE),
                font,
                &slide.title,
            );

            let mut y = BULLET_START_Y;
            for bullet in &slide.key_points {
                draw_text_mut(
                    &mut img,
                    black,
                    BULLET_X,
                    y,
                    PxScale::from(BULLET_SCALE),
                    font,
                    &format!("• {}", bullet),
                );
                y += BULLET_LINE_HEIGHT;
            }
        }

        img.save(target)
            .map_err(|e| AppError::render_save_failed(target.display().to_string(), e))?;

        debug!("幻灯片已渲染: {}", target.display());
        Ok(())
    }

    /// 是否加载到了可用字体
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

/// 按显式路径 + 候选列表加载第一款可用字体
fn load_font(explicit: Option<&str>) -> Option<FontVec> {
    let candidates = explicit
        .into_iter()
        .chain(FONT_CANDIDATES.iter().copied());

    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    debug!("使用字体: {}", path);
                    return Some(font);
                }
                Err(e) => warn!("字体文件无法解析 ({}): {}", path, e),
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slide::Slide;

    fn temp_png() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("course_gen_slide_{}.png", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_render_full_slide() {
        let renderer = SlideRenderer::new(&Config::default());
        let slide = Slide {
            title: "Welcome".to_string(),
            key_points: vec!["first".to_string(), "second".to_string()],
            icon_description: "spark".to_string(),
            color_accent: "#4A90E2".to_string(),
        };
        let target = temp_png();
        renderer.render(&slide, &target).unwrap();
        let meta = std::fs::metadata(&target).unwrap();
        assert!(meta.len() > 0);
        std::fs::remove_file(target).ok();
    }

    #[test]
    fn test_render_slide_without_optional_fields() {
        let renderer = SlideRenderer::new(&Config::default());
        // 零要点 + 无强调色也必须产出有效文件
        let slide = Slide {
            title: "Bare".to_string(),
            ..Slide::default()
        };
        let target = temp_png();
        renderer.render(&slide, &target).unwrap();
        assert!(target.exists());
        std::fs::remove_file(target).ok();
    }

    #[test]
    fn test_render_completely_empty_slide() {
        let renderer = SlideRenderer::new(&Config::default());
        let target = temp_png();
        renderer.render(&Slide::default(), &target).unwrap();
        assert!(target.exists());
        std::fs::remove_file(target).ok();
    }

    #[test]
    fn test_render_without_any_font() {
        // 字体全部缺失时退化为无文字版式，文件照样产出
        let renderer = SlideRenderer { font: None };
        let slide = Slide {
            title: "No Font".to_string(),
            key_points: vec!["point".to_string()],
            icon_description: String::new(),
            color_accent: "#FF8800".to_string(),
        };
        let target = temp_png();
        renderer.render(&slide, &target).unwrap();
        assert!(std::fs::metadata(&target).unwrap().len() > 0);
        std::fs::remove_file(target).ok();
    }
}
