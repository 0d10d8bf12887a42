//! 大纲合成服务 - 业务能力层
//!
//! 只负责"从一个主题合成课程大纲"能力：按课程规格确定课程数，
//! 发一次补全请求拿结构化大纲。合成失败不对外报错，输入形态
//! 问题永远不该挡住流水线，落到以主题命名的默认大纲。

use tracing::{info, warn};

use crate::config::Config;
use crate::models::course::CourseOutline;
use crate::models::preview;
use crate::services::llm_service::LlmService;
use crate::utils::strip_code_fence;

/// 课程规格（决定课程数量档位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseFormat {
    Micro,
    Standard,
    Masterclass,
}

impl CourseFormat {
    /// 从字符串解析，无法识别时取 Standard
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "micro" => CourseFormat::Micro,
            "masterclass" => CourseFormat::Masterclass,
            _ => CourseFormat::Standard,
        }
    }

    /// 规格对应的课程数区间
    pub fn lesson_range(&self) -> (usize, usize) {
        match self {
            CourseFormat::Micro => (3, 5),
            CourseFormat::Standard => (6, 10),
            CourseFormat::Masterclass => (12, 15),
        }
    }

    /// 确定性的课程数：取区间整数中点
    pub fn lesson_count(&self) -> usize {
        let (min, max) = self.lesson_range();
        (min + max) / 2
    }
}

/// 大纲合成服务
pub struct OutlineSynthesizer {
    llm: LlmService,
}

impl OutlineSynthesizer {
    /// 创建新的大纲合成服务
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
        }
    }

    /// 从主题合成大纲；失败时返回以主题命名的默认大纲
    pub async fn synthesize(&self, topic: &str, format: CourseFormat) -> CourseOutline {
        match self.try_synthesize(topic, format).await {
            Ok(outline) => {
                info!("✓ 大纲合成成功: {}", outline);
                outline
            }
            Err(e) => {
                warn!("⚠️ 大纲合成失败，使用默认大纲: {}", e);
                preview::default_outline(topic)
            }
        }
    }

    async fn try_synthesize(
        &self,
        topic: &str,
        format: CourseFormat,
    ) -> anyhow::Result<CourseOutline> {
        let prompt = build_outline_prompt(topic, format);

        let response = self
            .llm
            .send_to_llm(
                &prompt,
                Some("You are an expert online course creator and curriculum designer."),
                0.7,
            )
            .await?;

        let cleaned = strip_code_fence(&response);
        let value: serde_json::Value = serde_json::from_str(&cleaned)?;
        let outline = preview::normalize(&value);

        Ok(outline)
    }
}

/// 构建大纲合成提示词
fn build_outline_prompt(topic: &str, format: CourseFormat) -> String {
    let count = format.lesson_count();
    format!(
        r#"Create a full course outline in valid JSON for the topic below.

TOPIC: {topic}

Generate exactly {count} lessons total.
Each lesson must have its own unique, descriptive title relevant to the course
topic. Never use "Lesson 1" or generic numbering as the title.

Each lesson should include:
- "lesson_title": creative and relevant (not generic)
- "video_titles": a list of short, engaging video titles (about 2-3 per lesson)

Also include:
- "course_title": a compelling overall title
- "course_description": a short, clear summary of what learners will gain

Output rules:
- Return only valid JSON (no markdown, no explanations).
- Keep the number of lessons exactly {count}."#
    )
}
