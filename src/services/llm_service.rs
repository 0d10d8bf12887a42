//! 生成服务 - 业务能力层
//!
//! 只负责"调用一次文本补全"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;

/// 生成服务
///
/// 职责：
/// - 发送一次补全请求并取回响应文本
/// - 不剥围栏、不解析 JSON（由调用方按各自的载荷形态处理）
/// - 不重试：单次调用失败即失败，降级策略在流程层
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_output_tokens: u32,
}

impl LlmService {
    /// 创建新的生成服务
    pub fn new(config: &Config) -> Self {
        // 配置客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            max_output_tokens: config.llm_max_output_tokens,
        }
    }

    /// 通用的补全调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `temperature`: 采样温度，各生成阶段自行指定
    ///
    /// # 返回
    /// 返回响应内容（字符串，可能带代码围栏）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        temperature: f32,
    ) -> Result<String> {
        debug!("调用生成服务，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(self.max_output_tokens)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("生成服务调用失败: {}", e);
            anyhow::anyhow!("生成服务调用失败: {}", e)
        })?;

        debug!("生成服务调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("生成服务返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
