use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should move forward")
        .as_nanos();
    std::env::temp_dir().join(format!("mg-runtime-{}-{}", name, nanos))
}

pub(crate) fn write_file(path: &Path, content: &str) {
    let parent = path.parent().expect("path should have parent");
    fs::create_dir_all(parent).expect("parent dir should be created");
    fs::write(path, content).expect("file should be written");
}
