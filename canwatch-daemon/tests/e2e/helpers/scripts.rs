//! Detector scripts run with `sh` in place of the python detector.

use std::path::{Path, PathBuf};

/// Write an executable-by-`sh` script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write detector script");
    path
}

/// Script that appends `lines` to `alert_log`, then idles until terminated.
#[allow(dead_code)]
pub fn alerting_detector(alert_log: &Path, lines: &[&str]) -> String {
    let mut body = String::from("#!/bin/sh\n");
    for line in lines {
        body.push_str(&format!(
            "printf '%s\\n' '{}' >> '{}'\n",
            line,
            alert_log.display()
        ));
    }
    body.push_str("echo detector ready\nwhile true; do sleep 1; done\n");
    body
}

/// Script that idles until terminated.
#[allow(dead_code)]
pub fn idle_detector() -> String {
    "#!/bin/sh\nwhile true; do sleep 1; done\n".to_owned()
}

/// Script that ignores SIGTERM.
#[allow(dead_code)]
pub fn stubborn_detector() -> String {
    "#!/bin/sh\ntrap '' TERM\nwhile true; do sleep 1; done\n".to_owned()
}

/// Script that exits right away with `code`.
#[allow(dead_code)]
pub fn crashing_detector(code: i32) -> String {
    format!("#!/bin/sh\necho boom >&2\nexit {code}\n")
}
