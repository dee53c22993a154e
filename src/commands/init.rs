use crate::config::{self, ProjectConfig, CONFIG_FILE};
use crate::error::{NovelsubError, NovelsubResult};
use colored::*;
use serde::Serialize;
use std::path::Path;

const SAMPLE_SCRIPT: &str = r#"[
  {
    "id": "seg-001",
    "text": "夜色渐深，小镇上的灯火一盏盏熄灭。",
    "character": "narrator",
    "emotion": "calm",
    "type": "narration"
  },
  {
    "id": "seg-002",
    "text": "你听见了吗？外面好像有人在敲门。",
    "character": "林晚",
    "emotion": "nervous",
    "type": "dialogue"
  },
  {
    "id": "seg-003",
    "text": "他放下手中的书，侧耳倾听。风声里夹杂着断断续续的脚步声，由远及近，最后停在了门前：一切忽然安静下来。",
    "character": "narrator",
    "emotion": "tense",
    "type": "narration"
  }
]
"#;

/// Structured result from project initialization.
#[derive(Serialize)]
pub struct InitResult {
    pub project_path: String,
    pub files: Vec<String>,
}

/// Write a default `novelsub.toml` and a sample script into `path`.
pub fn create_project(path: &Path) -> NovelsubResult<InitResult> {
    if path.join(CONFIG_FILE).exists() {
        return Err(NovelsubError::AlreadyInitialized(path.join(CONFIG_FILE)));
    }
    std::fs::create_dir_all(path)?;

    let config = ProjectConfig::default();
    config::save_config(path, &config)?;
    std::fs::create_dir_all(config.output_dir(path))?;

    let mut files = vec![CONFIG_FILE.to_string()];
    let script_path = path.join("script.json");
    if !script_path.exists() {
        std::fs::write(&script_path, SAMPLE_SCRIPT)?;
        files.push("script.json".to_string());
    }

    Ok(InitResult {
        project_path: path.display().to_string(),
        files,
    })
}

pub fn run(path: &Path) -> NovelsubResult<()> {
    let result = create_project(path)?;

    eprintln!(
        "{} Created project at {}",
        "done:".green().bold(),
        result.project_path
    );
    for file in &result.files {
        eprintln!("  {file}");
    }
    eprintln!();
    eprintln!("Next: edit {}, then run:", "script.json".cyan());
    eprintln!("  novelsub generate {} -p {}", path.join("script.json").display(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input;

    #[test]
    fn test_create_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("novel");
        let result = create_project(&path).unwrap();
        assert_eq!(result.files, vec!["novelsub.toml", "script.json"]);

        let config = config::load_config(&path).unwrap();
        config.validate().unwrap();
        assert!(config.output_dir(&path).is_dir());

        let segments = input::load_segments(&path.join("script.json")).unwrap();
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_create_project_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        create_project(dir.path()).unwrap();
        assert!(matches!(
            create_project(dir.path()),
            Err(NovelsubError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_sample_script_generates() {
        let dir = tempfile::tempdir().unwrap();
        create_project(dir.path()).unwrap();
        let segments = input::load_segments(&dir.path().join("script.json")).unwrap();
        let result =
            crate::subtitle::generate_subtitles(&segments, &crate::subtitle::GenerateOptions::default())
                .unwrap();
        assert_eq!(result.segments_count, 3);
    }
}
