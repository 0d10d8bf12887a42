//! 单课生成流程 - 流程层
//!
//! 核心职责：定义"一节课"的完整生成协议
//!
//! 流程顺序：
//! 1. 补全调用 → 剥围栏 → 严格 JSON 解析 → 按索引/标题取脚本 → 落盘
//! 2. 任何一步失败 → 确定性占位内容（兜底）
//!
//! 两条路径产出的 [`GeneratedLesson`] 形态完全一致：降级对结果
//! 模式不可见，只能从日志观察到。外部服务的失败永远不会越过
//! 本流程的边界；只有产物落盘这类 I/O 失败才向上传播。

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::course::{
    GeneratedLesson, GeneratedVideo, LessonPayload, LessonSpec, Quiz, QuizQuestion,
};
use crate::services::{ArtifactStore, LlmService};
use crate::utils::{logging::truncate_text, strip_code_fence};

/// 单课生成结果的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonOutcome {
    /// 外部服务成功产出
    Generated,
    /// 走了占位内容兜底
    Degraded,
}

/// 单课生成流程
///
/// - 编排一节课的"生成或兜底"协议
/// - 只处理单节课，不出现 Vec<LessonSpec>
/// - 不关心课程之间的顺序
pub struct LessonFlow {
    llm: LlmService,
    store: ArtifactStore,
    verbose_logging: bool,
}

impl LessonFlow {
    /// 创建新的单课生成流程
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
            store: ArtifactStore::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 生成一节课的全部材料
    ///
    /// # 参数
    /// - `job_id`: 任务 ID（决定落盘目录）
    /// - `lesson_index`: 课程序号（从 1 开始）
    /// - `spec`: 课程大纲条目
    ///
    /// # 返回
    /// 始终返回一份完整的 [`GeneratedLesson`]；Err 只会由
    /// 产物落盘失败触发，由任务边界统一处理。
    pub async fn run(
        &self,
        job_id: &str,
        lesson_index: usize,
        spec: &LessonSpec,
    ) -> Result<(GeneratedLesson, LessonOutcome)> {
        let video_titles = effective_video_titles(spec);
        let lesson_dir = self.store.ensure_lesson_dir(job_id, lesson_index)?;

        if self.verbose_logging {
            info!(
                "[任务 {}] 课程 {} 视频列表: {:?}",
                job_id, lesson_index, video_titles
            );
        }

        match self
            .generate(job_id, lesson_index, &spec.title, &video_titles, &lesson_dir)
            .await
        {
            Ok(lesson) => Ok((lesson, LessonOutcome::Generated)),
            Err(e) => {
                warn!(
                    "[任务 {}] ⚠️ 课程 {} 生成失败，写入占位内容: {}",
                    job_id, lesson_index, e
                );
                let lesson =
                    self.fallback(lesson_index, &spec.title, &video_titles, &lesson_dir)?;
                Ok((lesson, LessonOutcome::Degraded))
            }
        }
    }

    /// 成功路径：一次外部调用 + 严格解析 + 落盘
    async fn generate(
        &self,
        job_id: &str,
        lesson_index: usize,
        lesson_title: &str,
        video_titles: &[String],
        lesson_dir: &std::path::Path,
    ) -> Result<GeneratedLesson> {
        let prompt = build_lesson_prompt(lesson_title, video_titles);

        let response = self
            .llm
            .send_to_llm(
                &prompt,
                Some(
                    "You are an expert course creator producing lesson scripts, \
                     quizzes and workbooks in strict JSON.",
                ),
                0.6,
            )
            .await?;

        if self.verbose_logging {
            info!(
                "[任务 {}] 课程 {} 响应预览: {}",
                job_id,
                lesson_index,
                truncate_text(&response, 120)
            );
        }

        // 围栏可能带语言标签，解析前必须剥掉
        let cleaned = strip_code_fence(&response);
        // 严格解析：不是合法 JSON 就按一次调用失败处理
        let payload: LessonPayload = serde_json::from_str(&cleaned)?;

        let mut videos = Vec::with_capacity(video_titles.len());
        for (idx, title) in video_titles.iter().enumerate() {
            let video_index = idx + 1;
            let script = resolve_script(&payload, video_index, title, lesson_title);
            let script_path =
                self.store
                    .write_script(lesson_dir, lesson_index, video_index, &script)?;
            videos.push(GeneratedVideo {
                title: title.clone(),
                script_file: script_path.display().to_string(),
                script_content: script,
            });
        }

        let quiz_path = self.store.write_quiz(lesson_dir, &payload.quiz)?;
        let workbook_path = self.store.write_workbook(lesson_dir, &payload.workbook)?;

        Ok(GeneratedLesson {
            lesson_title: lesson_title.to_string(),
            videos,
            quiz_file: quiz_path.display().to_string(),
            workbook_file: workbook_path.display().to_string(),
        })
    }

    /// 兜底路径：确定性占位内容，形态与成功路径一致
    fn fallback(
        &self,
        lesson_index: usize,
        lesson_title: &str,
        video_titles: &[String],
        lesson_dir: &std::path::Path,
    ) -> Result<GeneratedLesson> {
        let mut videos = Vec::with_capacity(video_titles.len());
        for (idx, title) in video_titles.iter().enumerate() {
            let video_index = idx + 1;
            let script = fallback_script(title, lesson_title);
            let script_path =
                self.store
                    .write_script(lesson_dir, lesson_index, video_index, &script)?;
            videos.push(GeneratedVideo {
                title: title.clone(),
                script_file: script_path.display().to_string(),
                script_content: script,
            });
        }

        let quiz = fallback_quiz(lesson_title);
        let quiz_path = self.store.write_quiz(lesson_dir, &quiz)?;
        let workbook_path = self
            .store
            .write_workbook(lesson_dir, &fallback_workbook(lesson_title))?;

        Ok(GeneratedLesson {
            lesson_title: lesson_title.to_string(),
            videos,
            quiz_file: quiz_path.display().to_string(),
            workbook_file: workbook_path.display().to_string(),
        })
    }
}

// ========== 纯函数辅助 ==========

/// 视频标题不足两个时用派生标题补齐（每节课至少两个视频）
pub fn effective_video_titles(spec: &LessonSpec) -> Vec<String> {
    match spec.video_titles.len() {
        0 => vec![
            format!("{} — Part 1", spec.title),
            format!("{} — Part 2", spec.title),
        ],
        1 => vec![
            spec.video_titles[0].clone(),
            format!("{} — Part 2", spec.title),
        ],
        _ => spec.video_titles.clone(),
    }
}

/// 按索引键 → 纯数字键 → 标题键的顺序取脚本，
/// 全部落空时给占位句（脚本内容绝不允许为空）
fn resolve_script(
    payload: &LessonPayload,
    video_index: usize,
    video_title: &str,
    lesson_title: &str,
) -> String {
    payload
        .scripts
        .get(&format!("video_{}", video_index))
        .or_else(|| payload.scripts.get(&video_index.to_string()))
        .or_else(|| payload.scripts.get(video_title))
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| missing_script_placeholder(video_title, lesson_title))
}

/// 成功路径上单个视频缺脚本时的占位句
fn missing_script_placeholder(video_title: &str, lesson_title: &str) -> String {
    format!(
        "Script for '{}'\n\nLesson: {}\n\n(Automatically generated placeholder - \
         model returned no script.)",
        video_title, lesson_title
    )
}

/// 兜底路径的占位脚本
fn fallback_script(video_title: &str, lesson_title: &str) -> String {
    format!(
        "Script for '{}'\n\nLesson: {}\nThis is an automatically generated \
         placeholder script. Replace with full AI output if desired.",
        video_title, lesson_title
    )
}

/// 兜底路径的通用测验
fn fallback_quiz(lesson_title: &str) -> Quiz {
    Quiz {
        questions: vec![QuizQuestion {
            question: format!("What is a key point from '{}'?", lesson_title),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            answer: "A".to_string(),
        }],
    }
}

/// 兜底路径的通用练习册
fn fallback_workbook(lesson_title: &str) -> String {
    format!(
        "Workbook / exercise for lesson '{}'. Reflect and answer the questions.",
        lesson_title
    )
}

/// 构建单课生成提示词：固定 JSON 形态（脚本映射 + 测验 + 练习册）
fn build_lesson_prompt(lesson_title: &str, video_titles: &[String]) -> String {
    format!(
        r#"You are an expert instructional designer and professional scriptwriter.
Create full lesson materials for the lesson titled: "{}".
Videos: {}

Return valid JSON ONLY (no markdown fences) in this exact structure:
{{
  "scripts": {{
    "video_1": "Full script text for first video...",
    "video_2": "Full script text for second video..."
  }},
  "quiz": {{
    "questions": [
      {{
        "question": "Question text",
        "options": ["A", "B", "C", "D"],
        "answer": "A"
      }}
    ]
  }},
  "workbook": "Short workbook/exercise text (a few bullet tasks or reflections)."
}}

Keep scripts actionable and specific to the lesson title. Keep quiz questions
short and focused. Workbook should include 3-5 reflection/exercise bullets."#,
        lesson_title,
        video_titles.join(", ")
    )
}
