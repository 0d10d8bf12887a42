//! 媒体生成服务 - 业务能力层
//!
//! 只负责"生成一张图片并落盘"能力，尽力而为：
//! 任何失败都在这里消化成 None，绝不影响任务状态。

use std::path::{Path, PathBuf};

use async_openai::{
    config::OpenAIConfig,
    types::images::{CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize},
    Client,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, MediaError};

/// 媒体生成服务
///
/// 职责：
/// - 分别生成方形 logo 与宽幅 banner，各自独立、各一次调用
/// - 成功则解码 base64 并写入任务目录，返回文件路径
/// - 失败只记日志，返回 None（调用方据此决定是否附带 URL）
pub struct MediaService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl MediaService {
    /// 创建新的媒体生成服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.image_model_name.clone(),
        }
    }

    /// 同时生成 logo 与 banner（互不影响）
    ///
    /// # 返回
    /// (logo 路径, banner 路径)，任一失败对应位置为 None
    pub async fn generate_course_media(
        &self,
        course_title: &str,
        course_description: &str,
        job_dir: &Path,
    ) -> (Option<PathBuf>, Option<PathBuf>) {
        futures::future::join(
            self.generate_logo(course_title, job_dir),
            self.generate_banner(course_title, course_description, job_dir),
        )
        .await
    }

    /// 生成方形课程 logo，写入 <job_dir>/logo.png
    pub async fn generate_logo(&self, course_title: &str, job_dir: &Path) -> Option<PathBuf> {
        let prompt = format!(
            "Create a minimalist, modern course logo for the course titled '{}'. \
             Simple, flat, high-end. Square composition, no text in the image.",
            course_title
        );
        let target = job_dir.join("logo.png");

        match self
            .generate_image("logo", &prompt, ImageSize::S1024x1024, &target)
            .await
        {
            Ok(()) => {
                info!("✓ logo 生成成功: {}", target.display());
                Some(target)
            }
            Err(e) => {
                warn!("⚠️ logo 生成失败（跳过）: {}", e);
                None
            }
        }
    }

    /// 生成宽幅课程 banner，写入 <job_dir>/banner.png
    pub async fn generate_banner(
        &self,
        course_title: &str,
        course_description: &str,
        job_dir: &Path,
    ) -> Option<PathBuf> {
        let prompt = format!(
            "Create a cinematic, premium hero banner for an online course.\n\
             Title: \"{}\"\n\
             Description: \"{}\"\n\
             Style: ultra-clean modern gradients, elegant lighting, minimalistic \
             composition, no text in the image, wide 16:9 framing.",
            course_title, course_description
        );
        let target = job_dir.join("banner.png");

        match self
            .generate_image("banner", &prompt, ImageSize::S1792x1024, &target)
            .await
        {
            Ok(()) => {
                info!("✓ banner 生成成功: {}", target.display());
                Some(target)
            }
            Err(e) => {
                warn!("⚠️ banner 生成失败（跳过）: {}", e);
                None
            }
        }
    }

    /// 单次图片生成：调用、解码、落盘
    async fn generate_image(
        &self,
        asset: &str,
        prompt: &str,
        size: ImageSize,
        target: &Path,
    ) -> AppResult<()> {
        let request = CreateImageRequestArgs::default()
            .model(ImageModel::Other(self.model_name.clone()))
            .prompt(prompt)
            .n(1)
            .size(size)
            .response_format(ImageResponseFormat::B64Json)
            .build()
            .map_err(|e| {
                AppError::Media(MediaError::GenerationFailed {
                    asset: asset.to_string(),
                    source: Box::new(e),
                })
            })?;

        let response = self.client.images().generate(request).await.map_err(|e| {
            AppError::Media(MediaError::GenerationFailed {
                asset: asset.to_string(),
                source: Box::new(e),
            })
        })?;

        let first = response.data.first().ok_or_else(|| {
            AppError::Media(MediaError::EmptyImageData {
                asset: asset.to_string(),
            })
        })?;

        let b64 = match first.as_ref() {
            Image::B64Json { b64_json, .. } => b64_json.as_str().to_string(),
            Image::Url { .. } => {
                return Err(AppError::Media(MediaError::EmptyImageData {
                    asset: asset.to_string(),
                }))
            }
        };

        let bytes = BASE64.decode(b64.as_bytes()).map_err(|e| {
            AppError::Media(MediaError::DecodeFailed {
                asset: asset.to_string(),
                source: Box::new(e),
            })
        })?;

        std::fs::write(target, bytes)
            .map_err(|e| AppError::file_write_failed(target.display().to_string(), e))?;

        Ok(())
    }
}
