use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 规范化后的课程大纲
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub lessons: Vec<LessonSpec>,
}

/// 单节课的大纲条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSpec {
    pub title: String,
    #[serde(default)]
    pub video_titles: Vec<String>,
}

impl std::fmt::Display for CourseOutline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} 节课)", self.title, self.lessons.len())
    }
}

/// 生成完成的单个视频
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedVideo {
    pub title: String,
    /// 脚本文件路径
    pub script_file: String,
    /// 脚本全文（内联保存一份，方便下游直接使用）
    pub script_content: String,
}

/// 生成完成的单节课
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLesson {
    pub lesson_title: String,
    pub videos: Vec<GeneratedVideo>,
    pub quiz_file: String,
    pub workbook_file: String,
}

/// course.json 的序列化形态
///
/// 只包含打包前就已确定的内容；压缩包路径和媒体 URL
/// 属于任务结果（[`CourseResult`]），不写进 course.json。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    pub lessons: Vec<GeneratedLesson>,
}

/// 任务最终结果（status = done 时对外可见）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResult {
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    pub lessons: Vec<GeneratedLesson>,
    /// 整个任务目录的压缩包路径
    pub archive_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
}

/// 测验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// 生成服务返回的单课载荷
///
/// 三个字段都允许缺失：缺失按空值处理，脚本查找落空时
/// 由课程流程补占位文本；字段类型不符则整体解析失败，
/// 按一次调用失败走降级路径。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonPayload {
    #[serde(default)]
    pub scripts: HashMap<String, String>,
    #[serde(default)]
    pub quiz: Quiz,
    #[serde(default)]
    pub workbook: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_payload_tolerates_missing_fields() {
        let payload: LessonPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.scripts.is_empty());
        assert!(payload.quiz.questions.is_empty());
        assert!(payload.workbook.is_empty());
    }

    #[test]
    fn test_lesson_payload_full_shape() {
        let raw = r#"{
            "scripts": {"video_1": "hello"},
            "quiz": {"questions": [{"question": "Q", "options": ["A","B","C","D"], "answer": "A"}]},
            "workbook": "do the thing"
        }"#;
        let payload: LessonPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.scripts.get("video_1").map(String::as_str), Some("hello"));
        assert_eq!(payload.quiz.questions.len(), 1);
        assert_eq!(payload.quiz.questions[0].options.len(), 4);
        assert_eq!(payload.workbook, "do the thing");
    }

    #[test]
    fn test_course_document_round_trip() {
        let doc = CourseDocument {
            course_title: "T".to_string(),
            course_description: "D".to_string(),
            lessons: vec![GeneratedLesson {
                lesson_title: "L1".to_string(),
                videos: vec![GeneratedVideo {
                    title: "V1".to_string(),
                    script_file: "lesson_1/script_l1_v1.txt".to_string(),
                    script_content: "text".to_string(),
                }],
                quiz_file: "lesson_1/quiz.json".to_string(),
                workbook_file: "lesson_1/workbook.txt".to_string(),
            }],
        };
        let json = serde_json::to_string_pretty(&doc).unwrap();
        let back: CourseDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.course_title, "T");
        assert_eq!(back.lessons.len(), 1);
        assert_eq!(back.lessons[0].videos[0].title, "V1");
    }

    #[test]
    fn test_course_result_omits_absent_media() {
        let result = CourseResult {
            course_title: "T".to_string(),
            course_description: String::new(),
            lessons: Vec::new(),
            archive_path: "generated/x.zip".to_string(),
            logo_url: None,
            banner_url: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("logo_url"));
        assert!(!json.contains("banner_url"));
    }
}
