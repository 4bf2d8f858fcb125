/// 默认的文件名，当客户端提供的文件名只包含目录部分时使用
pub const FALLBACK_FILE_NAME: &str = "upload";

/// 从客户端提供的文件名中去掉目录部分
///
/// 同时处理正斜杠与反斜杠，因为浏览器可能上传 Windows 风格的路径。
///
/// # 参数
///
/// * `original` - 客户端提供的原始文件名
///
/// # 返回值
///
/// 不含目录部分的文件名；若结果为空或为 `.`/`..` 则返回 `FALLBACK_FILE_NAME`
///
/// # 示例
///
/// ```
/// use upload_relay::utils::path::base_name;
///
/// assert_eq!(base_name("creds.json"), "creds.json");
/// assert_eq!(base_name("../../etc/creds.json"), "creds.json");
/// assert_eq!(base_name("C:\\Users\\me\\creds.json"), "creds.json");
/// ```
pub fn base_name(original: &str) -> &str {
    let name = original.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match name {
        "" | "." | ".." => FALLBACK_FILE_NAME,
        name => name,
    }
}

/// 根据文件名推断上传对象的 MIME 类型
///
/// 无法识别的扩展名返回 `application/octet-stream`。
pub fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
