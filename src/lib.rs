//! # Course Gen
//!
//! 一个课程内容生成流水线：接收课程大纲，驱动多阶段的后台
//! 生成任务（逐课脚本/测验/练习册、可选封面媒体、整目录打包），
//! 并提供独立的"脚本 → 幻灯片组 → 图片"渲染链路。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 大纲、生成结果、测验、幻灯片组的 serde 模型
//! - `models/preview` - 预览载荷规范化（枚举形态 + 默认大纲兜底）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个对象
//! - `LlmService` - 一次补全调用能力
//! - `MediaService` - 尽力而为的图片生成能力
//! - `ArtifactStore` - 任务目录布局与打包能力
//! - `SlideRenderer` - 单张幻灯片渲染能力
//! - `OutlineSynthesizer` - 主题 → 大纲合成能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一节课"的完整处理流程
//! - `LessonFlow` - 生成或兜底协议（降级绝不越界）
//! - `SlideFlow` - 改进 → 合成 → 渲染三段链路
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/job_registry` - 进程内任务注册表（共享读、独占写）
//! - `orchestrator/job_manager` - 提交/查询，非阻塞调度，终态保证
//! - `orchestrator/course_pipeline` - 单任务后台执行体
//!
//! ## 并发模型
//!
//! 每个任务是一个独立的后台执行单元（`tokio::spawn`），任务之间
//! 无顺序保证；任务内部课程严格按大纲顺序。注册表写入对读者
//! 原子可见，轮询读者拿到的永远是完整快照。不支持取消。

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CourseOutline, CourseResult, GeneratedLesson, SlideDeck};
pub use orchestrator::{CourseOrchestrator, JobRegistry, JobStatus};
pub use workflow::{LessonFlow, SlideFlow};
