//! 幻灯片流程 - 流程层
//!
//! 核心职责：定义"一节课脚本 → 幻灯片图片"的三段链路
//!
//! 流程顺序：
//! 1. 脚本改进（失败用原文）
//! 2. 脚本 → 幻灯片组 JSON（失败用空组），落盘 slides.json
//! 3. 按组内顺序逐张渲染 PNG
//!
//! 三段都可单独调用，也可用 [`SlideFlow::run`] 串成一条同步链。
//! 与任务编排完全独立：这里只认 lesson_id，不认 job。

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::slide::{ImprovedScript, SlideDeck};
use crate::services::{ArtifactStore, LlmService, SlideRenderer};
use crate::utils::strip_code_fence;

/// 已渲染幻灯片的列表条目
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSlide {
    pub filename: String,
    /// 稳定的访问路径（静态挂载形式）
    pub url: String,
}

/// 幻灯片流程
pub struct SlideFlow {
    llm: LlmService,
    store: ArtifactStore,
    renderer: SlideRenderer,
}

impl SlideFlow {
    /// 创建新的幻灯片流程
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
            store: ArtifactStore::new(config),
            renderer: SlideRenderer::new(config),
        }
    }

    /// 阶段 1：脚本改进
    ///
    /// 期望响应为 {"improved_script": "..."}。解析失败时把响应原文
    /// 当作改进结果；调用本身失败时退回输入脚本。下游对任意文本
    /// 都能工作，这里不做占位替换。
    pub async fn improve_script(&self, lesson_id: &str, script: &str) -> String {
        let prompt = build_improve_prompt(script);

        let response = match self
            .llm
            .send_to_llm(
                &prompt,
                Some("You are a world-class coaching content creator."),
                0.7,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("[课程 {}] ⚠️ 脚本改进调用失败，保留原脚本: {}", lesson_id, e);
                return script.to_string();
            }
        };

        match serde_json::from_str::<ImprovedScript>(&strip_code_fence(&response)) {
            Ok(parsed) => parsed.improved_script,
            Err(_) => {
                warn!("[课程 {}] 脚本改进响应不是 JSON，按原文采用", lesson_id);
                response
            }
        }
    }

    /// 阶段 2：脚本 → 幻灯片组
    ///
    /// 调用失败或解析失败都落到空组；无论哪条路，slides.json 都会
    /// 写出去（落盘失败是 I/O 错误，向上传播）。
    pub async fn synthesize_deck(
        &self,
        lesson_id: &str,
        lesson_title: &str,
        script: &str,
    ) -> Result<SlideDeck> {
        let prompt = build_deck_prompt(lesson_title, script);

        let deck = match self
            .llm
            .send_to_llm(
                &prompt,
                Some("You are a professional slide designer for online courses."),
                0.4,
            )
            .await
        {
            Ok(response) => match serde_json::from_str::<SlideDeck>(&strip_code_fence(&response)) {
                Ok(deck) => deck,
                Err(e) => {
                    warn!("[课程 {}] ⚠️ 幻灯片响应解析失败，使用空组: {}", lesson_id, e);
                    SlideDeck::default()
                }
            },
            Err(e) => {
                warn!("[课程 {}] ⚠️ 幻灯片合成调用失败，使用空组: {}", lesson_id, e);
                SlideDeck::default()
            }
        };

        let path = self.store.write_slide_deck(lesson_id, &deck)?;
        info!(
            "[课程 {}] 幻灯片组已保存: {} ({} 张)",
            lesson_id,
            path.display(),
            deck.slides.len()
        );

        Ok(deck)
    }

    /// 阶段 3：按组内顺序渲染（文件名按 1 开始的位置命名）
    pub fn render_deck(&self, lesson_id: &str, deck: &SlideDeck) -> Result<Vec<String>> {
        self.store.ensure_slides_png_dir(lesson_id)?;

        let mut rendered = Vec::with_capacity(deck.slides.len());
        for (i, slide) in deck.slides.iter().enumerate() {
            let position = i + 1;
            let target = self.store.slide_png_path(lesson_id, position);
            self.renderer.render(slide, &target)?;
            rendered.push(format!("slide-{}.png", position));
        }

        info!("[课程 {}] ✓ 渲染完成，共 {} 张", lesson_id, rendered.len());
        Ok(rendered)
    }

    /// 完整链路：改进 → 合成 → 渲染，返回访问路径列表
    pub async fn run(
        &self,
        lesson_id: &str,
        lesson_title: &str,
        script: &str,
    ) -> Result<Vec<String>> {
        let improved = self.improve_script(lesson_id, script).await;
        let deck = self.synthesize_deck(lesson_id, lesson_title, &improved).await?;
        let files = self.render_deck(lesson_id, &deck)?;

        Ok(files
            .into_iter()
            .map(|f| slide_url(lesson_id, &f))
            .collect())
    }

    /// 列出某节课已渲染的幻灯片
    ///
    /// 尚未渲染时返回空列表（不是错误）。
    pub fn list_rendered(&self, lesson_id: &str) -> Result<Vec<RenderedSlide>> {
        let names = self.store.list_rendered_slides(lesson_id)?;
        Ok(names
            .into_iter()
            .map(|filename| RenderedSlide {
                url: slide_url(lesson_id, &filename),
                filename,
            })
            .collect())
    }
}

/// 单张幻灯片的稳定访问路径
fn slide_url(lesson_id: &str, filename: &str) -> String {
    format!("/generated/slides/{}/png/{}", lesson_id, filename)
}

// ========== 提示词 ==========

fn build_improve_prompt(script: &str) -> String {
    format!(
        r#"Improve the lesson script below with:

- clearer structure
- more emotional engagement
- confident, motivational tone
- short, punchy sentences
- practical instructions
- zero fluff
- keep full meaning
- no emojis

Return JSON:
{{
  "improved_script": ""
}}

Original Script:
{}"#,
        script
    )
}

fn build_deck_prompt(lesson_title: &str, script: &str) -> String {
    format!(
        r##"Convert this lesson script into structured slides with:

- minimalist, whiteboard-clean aesthetic
- flat icons
- short titles
- 3-6 bullet points per slide
- very high clarity

Return JSON:
{{
  "slides": [
    {{
      "SlideTitle": "",
      "KeyPoints": [],
      "IconDescription": "",
      "ColorAccent": "#4A90E2"
    }}
  ]
}}

Lesson Title: {}
Script:
{}"##,
        lesson_title, script
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_url_shape() {
        assert_eq!(
            slide_url("abc", "slide-1.png"),
            "/generated/slides/abc/png/slide-1.png"
        );
    }

    #[test]
    fn test_deck_prompt_carries_title_and_script() {
        let prompt = build_deck_prompt("Intro", "the script body");
        assert!(prompt.contains("Intro"));
        assert!(prompt.contains("the script body"));
        assert!(prompt.contains("SlideTitle"));
    }
}
