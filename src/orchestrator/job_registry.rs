//! 任务注册表 - 编排层
//!
//! ## 职责
//!
//! 进程内的任务状态存储：显式创建、可注入，随进程生存，
//! 不做任何持久化。写入只来自任务编排器；任意数量的轮询
//! 读者并发读取。
//!
//! ## 不变式
//!
//! - 状态序列是 queued → running → {done | error} 的子序列
//! - 终态只进入一次，之后不再变化
//! - result 与 error 互斥，非终态时都不存在
//! - 读者拿到的是整份克隆快照，永远不会看到写了一半的结果

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::course::{CourseOutline, CourseResult};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    /// 是否已到终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// 单个任务的注册表条目
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// 提交时的原始载荷
    pub payload: Value,
    /// 规范化后的大纲（流水线跑到规范化阶段后填充）
    pub outline: Option<CourseOutline>,
    /// 仅 status = done 时存在
    pub result: Option<CourseResult>,
    /// 仅 status = error 时存在
    pub error: Option<String>,
}

/// 任务注册表
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    /// 创建新的注册表（服务启动时创建一次）
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个新任务，初始状态 queued
    pub async fn insert(&self, job_id: &str, payload: Value) {
        let job = Job {
            id: job_id.to_string(),
            status: JobStatus::Queued,
            payload,
            outline: None,
            result: None,
            error: None,
        };
        self.jobs.write().await.insert(job_id.to_string(), job);
    }

    /// 后台任务开始执行时调用
    pub async fn mark_running(&self, job_id: &str) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status == JobStatus::Queued {
                job.status = JobStatus::Running;
            }
        }
    }

    /// 记录规范化后的大纲
    pub async fn set_outline(&self, job_id: &str, outline: CourseOutline) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.outline = Some(outline);
        }
    }

    /// 任务成功完成：status = done，附带结果
    ///
    /// 终态只进入一次，重复调用被忽略。
    pub async fn complete(&self, job_id: &str, result: CourseResult) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status.is_terminal() {
                warn!("⚠️ 任务 {} 已到终态 {}，忽略 complete", job_id, job.status);
                return;
            }
            job.status = JobStatus::Done;
            job.result = Some(result);
            job.error = None;
        }
    }

    /// 任务失败：status = error，附带错误信息
    pub async fn fail(&self, job_id: &str, message: impl Into<String>) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status.is_terminal() {
                warn!("⚠️ 任务 {} 已到终态 {}，忽略 fail", job_id, job.status);
                return;
            }
            job.status = JobStatus::Error;
            job.error = Some(message.into());
            job.result = None;
        }
    }

    /// 读取任务快照（整份克隆，未知 ID 返回 None）
    pub async fn snapshot(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// 只读取状态
    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).map(|j| j.status)
    }

    /// 当前登记的任务数
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
