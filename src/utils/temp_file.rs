//! 上传临时文件
//!
//! 上传内容先写入临时目录中的文件，再从该文件上传到存储端。
//! `TempUpload` 被丢弃时临时文件一定会被删除，无论请求在哪一步结束。

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::path::base_name;

/// 一次请求内的上传临时文件
pub struct TempUpload {
    file: NamedTempFile,
    writer: tokio::fs::File,
    original_name: String,
    size: u64,
}

impl TempUpload {
    /// 在指定目录中创建临时文件。
    ///
    /// # 参数
    ///
    /// * `dir` - 临时目录，必须已存在
    /// * `original_name` - 客户端提供的原始文件名
    ///
    /// # Errors
    ///
    /// 无法创建临时文件时返回 I/O 错误。
    pub fn create_in(dir: &Path, original_name: impl Into<String>) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);

        Ok(Self {
            file,
            writer,
            original_name: original_name.into(),
            size: 0,
        })
    }

    /// 追加一段上传内容
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// 等待所有写入落盘，之后才能按路径读取文件
    pub async fn finish(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// 去掉目录部分后的文件名
    pub fn file_name(&self) -> &str {
        base_name(&self.original_name)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// 删除临时文件并报告删除结果。
    ///
    /// 不调用此方法时，丢弃 `TempUpload` 也会删除文件，只是错误会被忽略。
    pub fn remove(self) -> io::Result<()> {
        let Self { file, writer, .. } = self;
        drop(writer);
        file.close()
    }
}
