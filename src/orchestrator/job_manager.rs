//! 任务编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **提交**：分配任务 ID，登记 queued 条目，把流水线排进
//!    任务调度器后立即返回；返回的是任务 ID，不是 future
//! 2. **查询**：按 ID 读状态 / 读快照，未知 ID 返回 None
//! 3. **终态保证**：流水线体的任何错误都在这里收口为 error，
//!    任务绝不会永远停在 running
//!
//! ## 设计特点
//!
//! - **非阻塞提交**：`submit` 在流水线体执行前就返回
//! - **无取消**：一旦排入调度器就跑到终态或进程退出，这是
//!   明确的能力边界而不是疏漏
//! - **多任务并发**：任务之间没有顺序保证；任务内部课程
//!   严格按大纲顺序

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::orchestrator::course_pipeline;
use crate::orchestrator::job_registry::{Job, JobRegistry, JobStatus};

/// 任务编排器
pub struct CourseOrchestrator {
    config: Arc<Config>,
    registry: Arc<JobRegistry>,
}

impl CourseOrchestrator {
    /// 创建新的编排器（注册表随之创建，进程生存期）
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(JobRegistry::new()),
        }
    }

    /// 使用外部注入的注册表创建（便于多个读端共享）
    pub fn with_registry(config: Config, registry: Arc<JobRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// 共享的任务注册表句柄
    pub fn registry(&self) -> Arc<JobRegistry> {
        self.registry.clone()
    }

    /// 提交一个课程生成任务
    ///
    /// 立即返回新分配的任务 ID；流水线体在后台执行。
    /// 并发提交安全，ID 永不碰撞。
    pub async fn submit(&self, payload: Value) -> String {
        let job_id = Uuid::new_v4().to_string();
        self.registry.insert(&job_id, payload).await;
        info!("🚀 任务 {} 已入队", job_id);

        let registry = self.registry.clone();
        let config = self.config.clone();
        let id = job_id.clone();

        tokio::spawn(async move {
            registry.mark_running(&id).await;

            // 最外层边界：任务必须到达终态
            match course_pipeline::execute(&id, &registry, &config).await {
                Ok(result) => {
                    registry.complete(&id, result).await;
                }
                Err(e) => {
                    error!("💥 任务 {} 执行失败: {:#}", id, e);
                    registry.fail(&id, e.to_string()).await;
                }
            }
        });

        job_id
    }

    /// 查询任务状态（未知 ID 返回 None）
    pub async fn get_status(&self, job_id: &str) -> Option<JobStatus> {
        self.registry.status(job_id).await
    }

    /// 查询任务快照：状态 + 终态时的结果或错误（未知 ID 返回 None）
    pub async fn get_result(&self, job_id: &str) -> Option<Job> {
        self.registry.snapshot(job_id).await
    }
}
