use serde::{Deserialize, Serialize};

/// 幻灯片组（slides.json 的序列化形态）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideDeck {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

/// 单张幻灯片
///
/// 字段名沿用生成服务的线上形态（SlideTitle / KeyPoints / ...），
/// 可选字段缺失时取空值，渲染阶段必须都能容忍。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    #[serde(rename = "SlideTitle", default)]
    pub title: String,
    #[serde(rename = "KeyPoints", default)]
    pub key_points: Vec<String>,
    #[serde(rename = "IconDescription", default)]
    pub icon_description: String,
    #[serde(rename = "ColorAccent", default)]
    pub color_accent: String,
}

impl Slide {
    /// 解析 #RRGGBB 形式的强调色，非法值返回 None（按中性处理）
    pub fn accent_rgb(&self) -> Option<[u8; 3]> {
        let hex = self.color_accent.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some([r, g, b])
    }
}

/// 改进脚本阶段的响应形态
#[derive(Debug, Clone, Deserialize)]
pub struct ImprovedScript {
    pub improved_script: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_wire_field_names() {
        let raw = r##"{
            "slides": [
                {"SlideTitle": "Intro", "KeyPoints": ["a", "b"], "IconDescription": "spark", "ColorAccent": "#4A90E2"}
            ]
        }"##;
        let deck: SlideDeck = serde_json::from_str(raw).unwrap();
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].title, "Intro");
        assert_eq!(deck.slides[0].key_points, vec!["a", "b"]);
        assert_eq!(deck.slides[0].accent_rgb(), Some([0x4A, 0x90, 0xE2]));
    }

    #[test]
    fn test_slide_missing_optional_fields() {
        let slide: Slide = serde_json::from_str(r#"{"SlideTitle": "Bare"}"#).unwrap();
        assert_eq!(slide.title, "Bare");
        assert!(slide.key_points.is_empty());
        assert!(slide.icon_description.is_empty());
        assert!(slide.color_accent.is_empty());
        assert_eq!(slide.accent_rgb(), None);
    }

    #[test]
    fn test_accent_rgb_rejects_malformed() {
        let mut slide = Slide::default();
        for bad in ["4A90E2", "#12345", "#GGGGGG", "", "#1234567"] {
            slide.color_accent = bad.to_string();
            assert_eq!(slide.accent_rgb(), None, "应拒绝: {}", bad);
        }
    }

    #[test]
    fn test_empty_deck_round_trip() {
        let deck: SlideDeck = serde_json::from_str("{}").unwrap();
        assert!(deck.slides.is_empty());
        let json = serde_json::to_string(&deck).unwrap();
        let back: SlideDeck = serde_json::from_str(&json).unwrap();
        assert!(back.slides.is_empty());
    }
}
