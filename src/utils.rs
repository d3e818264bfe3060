// 工具模块

use std::path::PathBuf;
use std::process::Command;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// Windows 下隐藏控制台窗口的标志
#[cfg(target_os = "windows")]
pub const CREATE_NO_WINDOW: u32 = 0x08000000;

/// 创建一个隐藏控制台窗口的 Command（Windows 专用）
/// 在非 Windows 平台上等同于 Command::new
#[cfg(target_os = "windows")]
pub fn hidden_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

#[cfg(not(target_os = "windows"))]
pub fn hidden_command(program: &str) -> Command {
    Command::new(program)
}

/// 生成 UUID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 获取可执行文件所在目录
pub fn get_exe_dir() -> Option<PathBuf> {
    std::env::current_exe().ok()?.parent().map(|p| p.to_path_buf())
}

/// 解析程序路径，优先使用相对于可执行文件的 ffmpeg 目录
pub fn resolve_tool_path(tool_name: &str) -> String {
    if let Some(exe_dir) = get_exe_dir() {
        let tool_path = exe_dir.join("ffmpeg").join(format!("{}.exe", tool_name));
        if tool_path.exists() {
            return tool_path.to_string_lossy().to_string();
        }
        let tool_path = exe_dir.join(format!("{}.exe", tool_name));
        if tool_path.exists() {
            return tool_path.to_string_lossy().to_string();
        }
    }
    // 回退到系统 PATH
    tool_name.to_string()
}

/// 获取应用数据目录（项目目录下的 data 文件夹）
pub fn get_app_data_dir() -> PathBuf {
    if let Some(exe_dir) = get_exe_dir() {
        // 开发模式下，exe 在 target/debug 或 target/release，需要回到项目根目录
        let in_target = ["target/debug", "target\\debug", "target/release", "target\\release"]
            .iter()
            .any(|suffix| exe_dir.ends_with(suffix));
        if in_target {
            return exe_dir
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.join("data"))
                .unwrap_or_else(|| exe_dir.join("data"));
        }
        // 生产环境，数据目录在 exe 同级
        return exe_dir.join("data");
    }

    // 回退到当前工作目录
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}

/// 将相对路径解析到基准目录下，绝对路径原样返回
pub fn resolve_relative(base: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_tool_falls_back_to_path() {
        assert_eq!(resolve_tool_path("surely-not-bundled-tool"), "surely-not-bundled-tool");
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/data");
        assert_eq!(resolve_relative(base, Path::new("my_sounds")), PathBuf::from("/data/my_sounds"));
        assert_eq!(resolve_relative(base, Path::new("/abs/x.mp3")), PathBuf::from("/abs/x.mp3"));
    }
}
