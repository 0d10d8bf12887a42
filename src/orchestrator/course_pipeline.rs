//! 课程生成流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是单个任务的后台执行体，按固定顺序推进：
//!
//! 1. **规范化**：任意形态的预览载荷 → 课程大纲
//! 2. **逐课生成**：严格按大纲顺序调用单课流程，单课失败由
//!    流程内部兜底，绝不中断循环
//! 3. **打包**：course.json + 整目录压缩包
//! 4. **媒体**：logo / banner，尽力而为
//! 5. **汇总**：组装最终结果
//!
//! 任何越过这里的错误（基本只剩 I/O）由任务边界捕获并记为
//! error 终态。

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::course::{CourseDocument, CourseResult};
use crate::models::preview;
use crate::orchestrator::job_registry::JobRegistry;
use crate::services::{ArtifactStore, MediaService};
use crate::workflow::{LessonFlow, LessonOutcome};

/// 逐课生成统计
#[derive(Debug, Default)]
struct LessonStats {
    generated: usize,
    degraded: usize,
}

/// 执行一个任务的完整流水线
///
/// # 参数
/// - `job_id`: 任务 ID
/// - `registry`: 任务注册表（用于记录规范化大纲）
/// - `config`: 配置
///
/// # 返回
/// 成功时返回组装好的最终结果；Err 由调用方记为 error 终态
pub async fn execute(
    job_id: &str,
    registry: &JobRegistry,
    config: &Config,
) -> Result<CourseResult> {
    let payload = registry
        .snapshot(job_id)
        .await
        .map(|job| job.payload)
        .context("任务载荷不存在")?;

    // ========== 阶段 1: 规范化 ==========
    let outline = preview::normalize(&payload);
    registry.set_outline(job_id, outline.clone()).await;
    log_course_start(job_id, &outline.title, outline.lessons.len());

    let store = ArtifactStore::new(config);
    let job_dir = store.ensure_job_dir(job_id)?;

    // ========== 阶段 2: 逐课生成（严格按大纲顺序） ==========
    let lesson_flow = LessonFlow::new(config);
    let mut lessons = Vec::with_capacity(outline.lessons.len());
    let mut stats = LessonStats::default();

    for (i, spec) in outline.lessons.iter().enumerate() {
        let lesson_index = i + 1;
        log_lesson_start(job_id, lesson_index, outline.lessons.len(), &spec.title);

        let (lesson, outcome) = lesson_flow.run(job_id, lesson_index, spec).await?;
        match outcome {
            LessonOutcome::Generated => {
                stats.generated += 1;
                info!(
                    "[任务 {}] ✓ 课程 {} 生成成功 (视频: {})",
                    job_id,
                    lesson_index,
                    lesson.videos.len()
                );
            }
            LessonOutcome::Degraded => {
                stats.degraded += 1;
                info!("[任务 {}] ℹ️ 课程 {} 已写入占位内容", job_id, lesson_index);
            }
        }
        lessons.push(lesson);
    }

    // ========== 阶段 3: 打包 ==========
    let document = CourseDocument {
        course_title: outline.title.clone(),
        course_description: outline.description.clone(),
        lessons,
    };
    store.write_course_json(job_id, &document)?;
    let archive_path = store.archive_job(job_id)?;

    // ========== 阶段 4: 媒体（尽力而为，不影响任务状态） ==========
    let media = MediaService::new(config);
    let (logo_path, banner_path) = media
        .generate_course_media(&document.course_title, &document.course_description, &job_dir)
        .await;

    let logo_url = logo_path.map(|_| media_url(config, job_id, "logo.png"));
    let banner_url = banner_path.map(|_| media_url(config, job_id, "banner.png"));
    if logo_url.is_none() && banner_url.is_none() {
        warn!("[任务 {}] 本次没有生成任何媒体资源", job_id);
    }

    // ========== 阶段 5: 汇总 ==========
    let result = CourseResult {
        course_title: document.course_title,
        course_description: document.course_description,
        lessons: document.lessons,
        archive_path: archive_path.display().to_string(),
        logo_url,
        banner_url,
    };

    log_course_complete(job_id, &result, &stats);
    Ok(result)
}

/// 媒体文件的对外 URL
fn media_url(config: &Config, job_id: &str, file_name: &str) -> String {
    format!(
        "{}/generated/{}/{}",
        config.public_base_url.trim_end_matches('/'),
        job_id,
        file_name
    )
}

// ========== 日志辅助函数 ==========

fn log_course_start(job_id: &str, title: &str, lesson_count: usize) {
    info!("[任务 {}] 开始生成", job_id);
    info!("[任务 {}] 课程: {}", job_id, title);
    info!("[任务 {}] 课程总数: {}", job_id, lesson_count);
}

fn log_lesson_start(job_id: &str, lesson_index: usize, total: usize, title: &str) {
    info!("\n[任务 {}] {}", job_id, "─".repeat(30));
    info!(
        "[任务 {}] 处理第 {}/{} 节课: {}",
        job_id, lesson_index, total, title
    );
}

fn log_course_complete(job_id: &str, result: &CourseResult, stats: &LessonStats) {
    info!(
        "[任务 {}] 课程统计: 生成 {}, 占位 {}, 总计 {}",
        job_id,
        stats.generated,
        stats.degraded,
        result.lessons.len()
    );
    info!(
        "[任务 {}] ✅ 生成完成，压缩包: {}\n",
        job_id, result.archive_path
    );
}
