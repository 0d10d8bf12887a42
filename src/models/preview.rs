//! 课程预览规范化
//!
//! 提交进来的"课程预览"载荷形态五花八门：裸字符串主题、
//! 包着 JSON 字符串的包装对象、包着结构化课程的包装对象、
//! 或者直接就是结构化对象。这里把可识别的形态逐一枚举，
//! 统一规范化为内部的 [`CourseOutline`]；任何形态都恢复不出
//! 课程时落到确定性的默认大纲，流水线绝不因输入缺失而停摆。

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::course::{CourseOutline, LessonSpec};

/// 默认大纲的课程数
const DEFAULT_LESSON_COUNT: usize = 5;

/// 预览载荷的可识别形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewShape {
    /// 裸字符串：可能是 JSON 编码的课程，也可能只是一个主题
    Topic(String),
    /// 包装对象，preview 字段携带 JSON 编码的预览字符串
    WrappedPreview(String),
    /// 包装对象，course 字段携带结构化课程
    WrappedCourse,
    /// 裸结构化对象
    Bare,
    /// 无法识别（null、数组、数字等）
    Unrecognized,
}

/// 判定载荷形态
pub fn classify(payload: &Value) -> PreviewShape {
    match payload {
        Value::String(s) => PreviewShape::Topic(s.clone()),
        Value::Object(map) => {
            if let Some(Value::String(preview)) = map.get("preview") {
                PreviewShape::WrappedPreview(preview.clone())
            } else if matches!(map.get("course"), Some(Value::Object(_))) {
                PreviewShape::WrappedCourse
            } else {
                PreviewShape::Bare
            }
        }
        _ => PreviewShape::Unrecognized,
    }
}

/// 把任意预览载荷规范化为课程大纲
pub fn normalize(payload: &Value) -> CourseOutline {
    let shape = classify(payload);
    debug!("预览载荷形态: {:?}", shape);

    match shape {
        PreviewShape::Topic(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => outline_from_object(&Value::Object(map)),
            // 不是 JSON 对象就按主题处理
            _ => topic_outline(&text),
        },
        PreviewShape::WrappedPreview(preview) => match serde_json::from_str::<Value>(&preview) {
            Ok(Value::Object(map)) => outline_from_object(&Value::Object(map)),
            _ => topic_outline(&preview),
        },
        PreviewShape::WrappedCourse => outline_from_object(&payload["course"]),
        PreviewShape::Bare => outline_from_object(payload),
        PreviewShape::Unrecognized => {
            warn!("⚠️ 预览载荷无法识别，使用默认大纲");
            default_outline("Untitled Course")
        }
    }
}

/// 从结构化对象中提取大纲
fn outline_from_object(value: &Value) -> CourseOutline {
    let title = string_field(value, &["course_title", "topic", "title"])
        .unwrap_or_else(|| "Untitled Course".to_string());
    let description = string_field(value, &["course_description", "description"])
        .unwrap_or_default();

    let mut lessons = Vec::new();
    let raw_lessons = value
        .get("lessons")
        .or_else(|| value.get("lessons_preview"))
        .and_then(Value::as_array);

    if let Some(items) = raw_lessons {
        for (i, item) in items.iter().enumerate() {
            lessons.push(lesson_from_value(item, i + 1));
        }
    }

    if lessons.is_empty() {
        warn!("⚠️ 载荷中恢复不出任何课程，替换为 {} 节默认课程", DEFAULT_LESSON_COUNT);
        lessons = default_lessons();
    }

    CourseOutline {
        title,
        description,
        lessons,
    }
}

/// 解析单个课程条目（字符串或对象）
fn lesson_from_value(item: &Value, index: usize) -> LessonSpec {
    match item {
        Value::String(s) => LessonSpec {
            title: s.clone(),
            video_titles: Vec::new(),
        },
        Value::Object(_) => {
            let title = string_field(item, &["lesson_title", "title"])
                .unwrap_or_else(|| format!("Lesson {}", index));
            let video_titles = item
                .get("video_titles")
                .or_else(|| item.get("videos"))
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            LessonSpec { title, video_titles }
        }
        _ => LessonSpec {
            title: format!("Lesson {}", index),
            video_titles: Vec::new(),
        },
    }
}

/// 按候选字段名依次取第一个非空字符串
fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// 裸主题对应的大纲（课程列表为默认）
fn topic_outline(topic: &str) -> CourseOutline {
    default_outline(topic.trim())
}

/// 确定性的默认大纲
pub fn default_outline(title: &str) -> CourseOutline {
    let title = if title.trim().is_empty() {
        "Untitled Course"
    } else {
        title.trim()
    };
    CourseOutline {
        title: title.to_string(),
        description: String::new(),
        lessons: default_lessons(),
    }
}

/// 默认的 5 节课，每节 2 个视频
pub fn default_lessons() -> Vec<LessonSpec> {
    (1..=DEFAULT_LESSON_COUNT)
        .map(|i| LessonSpec {
            title: format!("Lesson {}", i),
            video_titles: vec![format!("Video {}.1", i), format!("Video {}.2", i)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            classify(&json!("rust basics")),
            PreviewShape::Topic("rust basics".to_string())
        );
        assert_eq!(
            classify(&json!({"preview": "{}"})),
            PreviewShape::WrappedPreview("{}".to_string())
        );
        assert_eq!(classify(&json!({"course": {"title": "T"}})), PreviewShape::WrappedCourse);
        assert_eq!(classify(&json!({"title": "T"})), PreviewShape::Bare);
        assert_eq!(classify(&json!(null)), PreviewShape::Unrecognized);
        assert_eq!(classify(&json!([1, 2])), PreviewShape::Unrecognized);
    }

    #[test]
    fn test_normalize_bare_object() {
        let payload = json!({
            "course_title": "Mastering Tea",
            "course_description": "Brew well.",
            "lessons": [
                {"lesson_title": "Leaves", "video_titles": ["Picking", "Drying"]},
                {"lesson_title": "Water", "video_titles": ["Temperature"]}
            ]
        });
        let outline = normalize(&payload);
        assert_eq!(outline.title, "Mastering Tea");
        assert_eq!(outline.description, "Brew well.");
        assert_eq!(outline.lessons.len(), 2);
        assert_eq!(outline.lessons[0].video_titles, vec!["Picking", "Drying"]);
        assert_eq!(outline.lessons[1].title, "Water");
    }

    #[test]
    fn test_normalize_wrapped_course() {
        let payload = json!({"course": {"title": "T", "lessons": ["Intro"]}});
        let outline = normalize(&payload);
        assert_eq!(outline.title, "T");
        assert_eq!(outline.lessons.len(), 1);
        assert_eq!(outline.lessons[0].title, "Intro");
        assert!(outline.lessons[0].video_titles.is_empty());
    }

    #[test]
    fn test_normalize_wrapped_preview_json_string() {
        let inner = json!({"course_title": "Inner", "lessons": [{"title": "L"}]}).to_string();
        let payload = json!({ "preview": inner });
        let outline = normalize(&payload);
        assert_eq!(outline.title, "Inner");
        assert_eq!(outline.lessons.len(), 1);
    }

    #[test]
    fn test_normalize_wrapped_preview_plain_text() {
        let payload = json!({"preview": "just a topic"});
        let outline = normalize(&payload);
        assert_eq!(outline.title, "just a topic");
        // 主题恢复不出课程列表，落到默认大纲
        assert_eq!(outline.lessons.len(), 5);
    }

    #[test]
    fn test_normalize_topic_string() {
        let outline = normalize(&json!("Gardening 101"));
        assert_eq!(outline.title, "Gardening 101");
        assert_eq!(outline.lessons.len(), 5);
        assert_eq!(outline.lessons[0].title, "Lesson 1");
        assert_eq!(outline.lessons[4].title, "Lesson 5");
        assert_eq!(outline.lessons[0].video_titles, vec!["Video 1.1", "Video 1.2"]);
    }

    #[test]
    fn test_normalize_empty_lessons_substitutes_default() {
        let outline = normalize(&json!({"title": "T", "lessons": []}));
        assert_eq!(outline.title, "T");
        assert_eq!(outline.lessons.len(), 5);
        for (i, lesson) in outline.lessons.iter().enumerate() {
            assert_eq!(lesson.title, format!("Lesson {}", i + 1));
            assert_eq!(lesson.video_titles.len(), 2);
        }
    }

    #[test]
    fn test_normalize_alternate_field_names() {
        let payload = json!({
            "topic": "Alt",
            "lessons_preview": [{"title": "A", "videos": ["v1"]}]
        });
        let outline = normalize(&payload);
        assert_eq!(outline.title, "Alt");
        assert_eq!(outline.lessons[0].video_titles, vec!["v1"]);
    }

    #[test]
    fn test_normalize_unrecognized_payload() {
        let outline = normalize(&json!(42));
        assert_eq!(outline.title, "Untitled Course");
        assert_eq!(outline.lessons.len(), 5);
    }
}
