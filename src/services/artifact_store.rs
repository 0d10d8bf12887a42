//! 产物存储 - 业务能力层
//!
//! 只负责任务目录的布局与读写，不关心内容从哪来
//!
//! ## 目录契约
//!
//! - `<generated_root>/<job_id>/lesson_<n>/script_l<n>_v<i>.txt`
//! - `<generated_root>/<job_id>/lesson_<n>/quiz.json`
//! - `<generated_root>/<job_id>/lesson_<n>/workbook.txt`
//! - `<generated_root>/<job_id>/course.json`
//! - `<generated_root>/<job_id>/{logo.png, banner.png}`（可选）
//! - `<generated_root>/<job_id>.zip`
//! - `<slides_root>/<lesson_id>/slides.json`
//! - `<slides_root>/<lesson_id>/png/slide-<n>.png`

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::course::{CourseDocument, Quiz};
use crate::models::slide::SlideDeck;

/// 产物存储
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    generated_root: PathBuf,
    slides_root: PathBuf,
}

impl ArtifactStore {
    /// 创建新的产物存储
    pub fn new(config: &Config) -> Self {
        Self {
            generated_root: PathBuf::from(&config.generated_root),
            slides_root: PathBuf::from(&config.slides_root),
        }
    }

    // ========== 任务目录 ==========

    /// 任务目录路径
    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.generated_root.join(job_id)
    }

    /// 创建并返回任务目录
    pub fn ensure_job_dir(&self, job_id: &str) -> AppResult<PathBuf> {
        let dir = self.job_dir(job_id);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::create_dir_failed(dir.display().to_string(), e))?;
        Ok(dir)
    }

    /// 创建并返回课程子目录 lesson_<n>
    pub fn ensure_lesson_dir(&self, job_id: &str, lesson_index: usize) -> AppResult<PathBuf> {
        let dir = self.job_dir(job_id).join(format!("lesson_{}", lesson_index));
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::create_dir_failed(dir.display().to_string(), e))?;
        Ok(dir)
    }

    /// 写入单个视频脚本，返回文件路径
    pub fn write_script(
        &self,
        lesson_dir: &Path,
        lesson_index: usize,
        video_index: usize,
        text: &str,
    ) -> AppResult<PathBuf> {
        let path = lesson_dir.join(format!("script_l{}_v{}.txt", lesson_index, video_index));
        fs::write(&path, text)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }

    /// 写入测验文件 quiz.json
    pub fn write_quiz(&self, lesson_dir: &Path, quiz: &Quiz) -> AppResult<PathBuf> {
        let path = lesson_dir.join("quiz.json");
        let json = serde_json::to_string_pretty(quiz)?;
        fs::write(&path, json)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }

    /// 写入练习册文件 workbook.txt
    pub fn write_workbook(&self, lesson_dir: &Path, text: &str) -> AppResult<PathBuf> {
        let path = lesson_dir.join("workbook.txt");
        fs::write(&path, text)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }

    /// 写入 course.json
    pub fn write_course_json(&self, job_id: &str, doc: &CourseDocument) -> AppResult<PathBuf> {
        let path = self.job_dir(job_id).join("course.json");
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&path, json)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }

    // ========== 压缩包 ==========

    /// 压缩包路径 <generated_root>/<job_id>.zip
    pub fn archive_path(&self, job_id: &str) -> PathBuf {
        self.generated_root.join(format!("{}.zip", job_id))
    }

    /// 打包整个任务目录，替换同名旧包
    pub fn archive_job(&self, job_id: &str) -> AppResult<PathBuf> {
        let job_dir = self.job_dir(job_id);
        let zip_path = self.archive_path(job_id);

        // 同一任务重复打包只保留最新的一份
        if zip_path.exists() {
            fs::remove_file(&zip_path)
                .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
        }

        let file = File::create(&zip_path)
            .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(&job_dir).min_depth(1) {
            let entry =
                entry.map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
            let rel = entry
                .path()
                .strip_prefix(&job_dir)
                .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
            let name = rel.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                writer
                    .add_directory(format!("{}/", name), options)
                    .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
            } else {
                writer
                    .start_file(name, options)
                    .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
                let mut src = File::open(entry.path())
                    .map_err(|e| AppError::file_read_failed(entry.path().display().to_string(), e))?;
                io::copy(&mut src, &mut writer)
                    .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;
            }
        }

        writer
            .finish()
            .map_err(|e| AppError::archive_failed(zip_path.display().to_string(), e))?;

        debug!("任务 {} 已打包: {}", job_id, zip_path.display());
        Ok(zip_path)
    }

    // ========== 幻灯片目录 ==========

    /// 某节课的幻灯片目录
    pub fn slides_dir(&self, lesson_id: &str) -> PathBuf {
        self.slides_root.join(lesson_id)
    }

    /// 渲染输出目录 <slides>/<lesson_id>/png
    pub fn slides_png_dir(&self, lesson_id: &str) -> PathBuf {
        self.slides_dir(lesson_id).join("png")
    }

    /// 创建并返回渲染输出目录
    pub fn ensure_slides_png_dir(&self, lesson_id: &str) -> AppResult<PathBuf> {
        let dir = self.slides_png_dir(lesson_id);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::create_dir_failed(dir.display().to_string(), e))?;
        Ok(dir)
    }

    /// 写入 slides.json
    pub fn write_slide_deck(&self, lesson_id: &str, deck: &SlideDeck) -> AppResult<PathBuf> {
        let dir = self.slides_dir(lesson_id);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::create_dir_failed(dir.display().to_string(), e))?;
        let path = dir.join("slides.json");
        let json = serde_json::to_string_pretty(deck)?;
        fs::write(&path, json)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }

    /// 读取 slides.json
    pub fn read_slide_deck(&self, lesson_id: &str) -> AppResult<SlideDeck> {
        let path = self.slides_dir(lesson_id).join("slides.json");
        let raw = fs::read_to_string(&path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// 第 position 张幻灯片的输出路径（position 从 1 开始）
    pub fn slide_png_path(&self, lesson_id: &str, position: usize) -> PathBuf {
        self.slides_png_dir(lesson_id)
            .join(format!("slide-{}.png", position))
    }

    /// 列出已渲染的幻灯片文件名（按文件名排序）
    ///
    /// 目录不存在视为"尚未渲染"，返回空列表而不是错误。
    pub fn list_rendered_slides(&self, lesson_id: &str) -> AppResult<Vec<String>> {
        let dir = self.slides_png_dir(lesson_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.ends_with(".png"))
            .collect();
        names.sort();
        Ok(names)
    }
}
