//! 响应页面模板
//!
//! 所有插值都经过 askama 的 HTML 转义，客户端或存储端提供的名称可以直接传入。

use askama::Template;

/// 上传表单页面
#[derive(Template)]
#[template(path = "upload_form.html")]
pub struct UploadFormTemplate<'a> {
    pub field: &'a str,
}

/// 上传成功提示
#[derive(Template)]
#[template(
    source = "<p>✅ Uploaded <b>{{ file_name }}</b> to folder <b>{{ folder }}</b>.</p>",
    ext = "html"
)]
pub struct UploadedTemplate<'a> {
    pub file_name: &'a str,
    pub folder: &'a str,
}

/// 存储端拒绝上传时的错误页面
#[derive(Template)]
#[template(source = "Upload failed: {{ message }}", ext = "html")]
pub struct UploadFailedTemplate<'a> {
    pub message: &'a str,
}

/// 文件列表，每行一个文件名
#[derive(Template)]
#[template(
    source = "<h3>Files in {{ folder }}</h3>\n{% for name in names %}{% if !loop.first %}<br>\n{% endif %}{{ name }}{% endfor %}",
    ext = "html"
)]
pub struct FileListTemplate<'a> {
    pub folder: &'a str,
    pub names: &'a [String],
}
