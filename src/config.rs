/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 生成产物根目录（任务目录、压缩包都在这里）
    pub generated_root: String,
    /// 幻灯片产物根目录
    pub slides_root: String,
    /// 待提交的课程大纲 JSON 文件目录
    pub outline_folder: String,
    /// 对外访问产物时使用的基础 URL
    pub public_base_url: String,
    /// 状态轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 任务完成后是否继续为每节课渲染幻灯片
    pub render_slides: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 生成服务配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次补全的最大输出长度
    pub llm_max_output_tokens: u32,
    // --- 图片生成配置 ---
    pub image_model_name: String,
    /// 渲染字体路径（为空时按内置候选列表探测）
    pub slide_font_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generated_root: "generated".to_string(),
            slides_root: "generated/slides".to_string(),
            outline_folder: "outlines".to_string(),
            public_base_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_ms: 500,
            render_slides: false,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_max_output_tokens: 1500,
            image_model_name: "gpt-image-1".to_string(),
            slide_font_path: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            generated_root: std::env::var("GENERATED_ROOT").unwrap_or(default.generated_root),
            slides_root: std::env::var("SLIDES_ROOT").unwrap_or(default.slides_root),
            outline_folder: std::env::var("OUTLINE_FOLDER").unwrap_or(default.outline_folder),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or(default.public_base_url),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            render_slides: std::env::var("RENDER_SLIDES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_slides),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_output_tokens: std::env::var("LLM_MAX_OUTPUT_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_output_tokens),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            slide_font_path: std::env::var("SLIDE_FONT_PATH").unwrap_or(default.slide_font_path),
        }
    }
}
