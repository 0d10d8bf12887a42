//! 文本处理工具
//!
//! 生成服务的响应经常被包在 Markdown 代码围栏里（带或不带语言标签），
//! 解析 JSON 之前必须先剥掉围栏。

use regex::Regex;
use std::sync::OnceLock;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| {
        // 围栏形如 ```json\n...\n``` 或 ```\n...\n```，标签可选
        Regex::new(r"(?s)^```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\r?\n?```\s*$")
            .expect("静态正则表达式必定合法")
    })
}

/// 剥离响应外层的代码围栏
///
/// 幂等且全量：没有围栏的输入原样返回（仅去除首尾空白），
/// 已剥离过的输入再剥一次结果不变。
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    match fence_re().captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}
