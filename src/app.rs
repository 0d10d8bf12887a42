//! 批量任务驱动 - 应用入口
//!
//! ## 职责
//!
//! 本模块是二进制入口的主体，负责一次批量运行：
//!
//! 1. **扫描**：加载大纲目录下所有待提交的 JSON 文件
//! 2. **合成**：只给了主题的文件先走大纲合成
//! 3. **提交**：逐个提交给任务编排器（立即拿到任务 ID）
//! 4. **轮询**：按固定间隔轮询注册表直到所有任务到终态
//! 5. **幻灯片**：可选地为每节生成完成的课跑幻灯片链路
//! 6. **统计**：输出最终统计

use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::orchestrator::{CourseOrchestrator, JobStatus};
use crate::services::{CourseFormat, OutlineSynthesizer};
use crate::workflow::SlideFlow;

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: CourseOrchestrator,
}

/// 批量运行统计
#[derive(Debug, Default)]
struct RunStats {
    done: usize,
    errored: usize,
    total: usize,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        let orchestrator = CourseOrchestrator::new(config.clone());
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待提交的大纲
        let outlines = self.load_outlines()?;

        if outlines.is_empty() {
            warn!("⚠️ 没有找到待提交的大纲文件，程序结束");
            return Ok(());
        }

        info!("✓ 找到 {} 个待提交的大纲\n", outlines.len());

        // 逐个提交（提交本身不阻塞）
        let mut job_ids = Vec::with_capacity(outlines.len());
        for (name, payload) in outlines {
            let payload = self.resolve_payload(&name, payload).await;
            let job_id = self.orchestrator.submit(payload).await;
            info!("📤 {} → 任务 {}", name, job_id);
            job_ids.push(job_id);
        }

        // 轮询直到所有任务到终态
        let stats = self.poll_until_terminal(&job_ids).await;

        // 可选：为生成完成的课程渲染幻灯片
        if self.config.render_slides {
            self.render_all_slides(&job_ids).await;
        }

        print_final_stats(&stats);
        Ok(())
    }

    /// 加载大纲目录下的所有 JSON 文件
    fn load_outlines(&self) -> Result<Vec<(String, Value)>> {
        info!("\n📁 正在扫描待提交的大纲...");
        let folder = &self.config.outline_folder;

        let entries = fs::read_dir(folder)
            .with_context(|| format!("无法读取大纲目录: {}", folder))?;

        let mut outlines = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let raw = fs::read_to_string(&path)
                .with_context(|| format!("无法读取大纲文件: {}", path.display()))?;

            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => outlines.push((name, value)),
                Err(e) => warn!("⚠️ 跳过无法解析的大纲文件 {}: {}", name, e),
            }
        }

        outlines.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(outlines)
    }

    /// 只给了主题的载荷先合成出完整大纲
    async fn resolve_payload(&self, name: &str, payload: Value) -> Value {
        let topic = payload
            .get("topic")
            .and_then(Value::as_str)
            .map(str::to_string);

        match topic {
            Some(topic) if payload.get("lessons").is_none() => {
                let format = payload
                    .get("format")
                    .and_then(Value::as_str)
                    .map(CourseFormat::parse)
                    .unwrap_or(CourseFormat::Standard);

                info!("🧠 {} 只有主题，先合成大纲 ({:?})...", name, format);
                let synthesizer = OutlineSynthesizer::new(&self.config);
                let outline = synthesizer.synthesize(&topic, format).await;
                serde_json::to_value(&outline).unwrap_or(payload)
            }
            _ => payload,
        }
    }

    /// 轮询注册表直到所有任务到终态
    async fn poll_until_terminal(&self, job_ids: &[String]) -> RunStats {
        let mut stats = RunStats {
            total: job_ids.len(),
            ..Default::default()
        };
        let mut reported: HashSet<String> = HashSet::new();
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        while reported.len() < job_ids.len() {
            tokio::time::sleep(interval).await;

            for job_id in job_ids {
                if reported.contains(job_id) {
                    continue;
                }
                let Some(status) = self.orchestrator.get_status(job_id).await else {
                    continue;
                };
                if !status.is_terminal() {
                    continue;
                }

                reported.insert(job_id.clone());
                match status {
                    JobStatus::Done => {
                        stats.done += 1;
                        if let Some(job) = self.orchestrator.get_result(job_id).await {
                            if let Some(result) = job.result {
                                info!(
                                    "✅ 任务 {} 完成: {} 节课, 压缩包 {}",
                                    job_id,
                                    result.lessons.len(),
                                    result.archive_path
                                );
                            }
                        }
                    }
                    JobStatus::Error => {
                        stats.errored += 1;
                        if let Some(job) = self.orchestrator.get_result(job_id).await {
                            error!(
                                "❌ 任务 {} 失败: {}",
                                job_id,
                                job.error.unwrap_or_default()
                            );
                        }
                    }
                    _ => {}
                }
            }
        }

        stats
    }

    /// 为所有生成完成的课程跑幻灯片链路（尽力而为）
    async fn render_all_slides(&self, job_ids: &[String]) {
        info!("\n🖼️ 开始渲染幻灯片...");
        let slide_flow = SlideFlow::new(&self.config);

        for job_id in job_ids {
            let Some(job) = self.orchestrator.get_result(job_id).await else {
                continue;
            };
            let Some(result) = job.result else {
                continue;
            };

            for (i, lesson) in result.lessons.iter().enumerate() {
                let Some(video) = lesson.videos.first() else {
                    continue;
                };
                let lesson_id = format!("{}_lesson_{}", job_id, i + 1);

                match slide_flow
                    .run(&lesson_id, &lesson.lesson_title, &video.script_content)
                    .await
                {
                    Ok(urls) => info!("✓ 课程 {} 渲染 {} 张幻灯片", lesson_id, urls.len()),
                    Err(e) => warn!("⚠️ 课程 {} 幻灯片渲染失败: {}", lesson_id, e),
                }
            }
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 课程生成批量模式");
    info!("📁 大纲目录: {}", config.outline_folder);
    info!("📦 产物目录: {}", config.generated_root);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部任务完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", stats.done, stats.total);
    info!("❌ 失败: {}", stats.errored);
    info!("{}", "=".repeat(60));
}
