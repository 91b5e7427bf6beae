use std::fs;
use std::path::Path;

pub(crate) fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).expect("file should be written");
    path_str(&path)
}

pub(crate) fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
