use crate::error::{NovelsubError, NovelsubResult};
use crate::subtitle::render::{SubtitleFormat, TextEncoding};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A subtitle file written to, or found in, the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct SubtitleFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub modified: u64,
    pub format: SubtitleFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeDistribution {
    /// Under 1 KiB.
    pub small: usize,
    /// 1 KiB up to 10 KiB.
    pub medium: usize,
    pub large: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_files: usize,
    pub total_size: u64,
    pub formats: BTreeMap<String, usize>,
    pub size_distribution: SizeDistribution,
}

/// Subtitle files kept in one output directory.
///
/// File names embed a millisecond timestamp and a content hash, so concurrent
/// writers of different content never collide.
pub struct SubtitleStore {
    dir: PathBuf,
}

impl SubtitleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write rendered content as `subtitle_<millis>_<hash>.<ext>`.
    pub fn save(
        &self,
        content: &str,
        format: SubtitleFormat,
        encoding: TextEncoding,
    ) -> NovelsubResult<SubtitleFile> {
        std::fs::create_dir_all(&self.dir)?;
        let filename = file_name(now_millis(), content, format);
        let path = self.dir.join(&filename);
        std::fs::write(&path, encoding.encode(content))?;
        debug!("Wrote {} ({:?})", path.display(), encoding);
        self.describe(&filename)
    }

    /// All `.srt` and `.vtt` files, newest first.
    pub fn list(&self) -> NovelsubResult<Vec<SubtitleFile>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if format_of(&name).is_some() && entry.file_type()?.is_file() {
                files.push(self.describe(&name)?);
            }
        }
        files.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(files)
    }

    /// Read a stored file back as text, decoding UTF-16 when it carries a BOM.
    pub fn read(&self, filename: &str) -> NovelsubResult<String> {
        let path = self.existing_path(filename)?;
        let bytes = std::fs::read(&path)?;
        decode_text(&bytes).ok_or_else(|| {
            NovelsubError::Other(format!("{filename} is not valid UTF-8 or UTF-16 text"))
        })
    }

    pub fn delete(&self, filename: &str) -> NovelsubResult<()> {
        let path = self.existing_path(filename)?;
        std::fs::remove_file(&path)?;
        debug!("Deleted {}", path.display());
        Ok(())
    }

    pub fn stats(&self) -> NovelsubResult<StoreStats> {
        let files = self.list()?;
        let mut stats = StoreStats::default();
        for file in &files {
            stats.total_files += 1;
            stats.total_size += file.size;
            *stats.formats.entry(file.format.to_string()).or_insert(0) += 1;
            match file.size {
                0..=1023 => stats.size_distribution.small += 1,
                1024..=10239 => stats.size_distribution.medium += 1,
                _ => stats.size_distribution.large += 1,
            }
        }
        Ok(stats)
    }

    fn describe(&self, filename: &str) -> NovelsubResult<SubtitleFile> {
        let format = format_of(filename)
            .ok_or_else(|| NovelsubError::InvalidFileName(filename.to_string()))?;
        let path = self.dir.join(filename);
        let meta = std::fs::metadata(&path)?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Ok(SubtitleFile {
            filename: filename.to_string(),
            path,
            size: meta.len(),
            modified,
            format,
        })
    }

    fn existing_path(&self, filename: &str) -> NovelsubResult<PathBuf> {
        check_file_name(filename)?;
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(NovelsubError::SubtitleFileNotFound(filename.to_string()));
        }
        Ok(path)
    }
}

/// Reject names that would escape the output directory.
fn check_file_name(filename: &str) -> NovelsubResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(NovelsubError::InvalidFileName(filename.to_string()));
    }
    Ok(())
}

fn format_of(filename: &str) -> Option<SubtitleFormat> {
    let ext = Path::new(filename).extension()?.to_str()?;
    match ext {
        "srt" => Some(SubtitleFormat::Srt),
        "vtt" => Some(SubtitleFormat::Vtt),
        _ => None,
    }
}

fn file_name(millis: u128, content: &str, format: SubtitleFormat) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let hash: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("subtitle_{millis}_{hash}.{}", format.extension())
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Decode UTF-16LE with a BOM, otherwise UTF-8.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] if rest.len() % 2 == 0 => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_shape() {
        let name = file_name(1_700_000_000_123, "1\n00:00:00,000 --> 00:00:01,000\n你好", SubtitleFormat::Srt);
        assert!(name.starts_with("subtitle_1700000000123_"));
        assert!(name.ends_with(".srt"));
        // subtitle_ + 13 digits + _ + 8 hex + .srt
        assert_eq!(name.len(), "subtitle_".len() + 13 + 1 + 8 + 4);
    }

    #[test]
    fn test_file_name_varies_on_content() {
        let a = file_name(1, "a", SubtitleFormat::Vtt);
        let b = file_name(1, "b", SubtitleFormat::Vtt);
        assert_ne!(a, b);
    }

    #[test]
    fn test_save_and_read_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubtitleStore::new(dir.path().join("subs"));
        let saved = store
            .save("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\n你好", SubtitleFormat::Vtt, TextEncoding::Utf8)
            .unwrap();
        assert_eq!(saved.format, SubtitleFormat::Vtt);
        assert!(saved.path.exists());
        let content = store.read(&saved.filename).unwrap();
        assert!(content.ends_with("你好"));
    }

    #[test]
    fn test_save_and_read_utf16() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubtitleStore::new(dir.path());
        let text = "1\n00:00:00,000 --> 00:00:01,000\n你好";
        let saved = store.save(text, SubtitleFormat::Srt, TextEncoding::Utf16).unwrap();
        assert_eq!(saved.size as usize, 2 + text.encode_utf16().count() * 2);
        assert_eq!(store.read(&saved.filename).unwrap(), text);
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("subtitle_1_aaaa.srt"), "x").unwrap();
        std::fs::write(dir.path().join("subtitle_2_bbbb.vtt"), "y").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "z").unwrap();
        let store = SubtitleStore::new(dir.path());
        let files = store.list().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.filename.starts_with("subtitle_")));
    }

    #[test]
    fn test_list_missing_dir() {
        let store = SubtitleStore::new("/nonexistent/novelsub/subs");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubtitleStore::new(dir.path());
        let saved = store.save("1\n00:00:00,000 --> 00:00:01,000\nA", SubtitleFormat::Srt, TextEncoding::Utf8).unwrap();
        store.delete(&saved.filename).unwrap();
        assert!(!saved.path.exists());
        assert!(matches!(
            store.delete(&saved.filename),
            Err(NovelsubError::SubtitleFileNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubtitleStore::new(dir.path());
        assert!(matches!(
            store.read("../secret.srt"),
            Err(NovelsubError::InvalidFileName(_))
        ));
        assert!(matches!(
            store.delete("a/b.srt"),
            Err(NovelsubError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.srt"), "x".repeat(10)).unwrap();
        std::fs::write(dir.path().join("b.srt"), "x".repeat(2048)).unwrap();
        std::fs::write(dir.path().join("c.vtt"), "x".repeat(20_000)).unwrap();
        let stats = SubtitleStore::new(dir.path()).stats().unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 10 + 2048 + 20_000);
        assert_eq!(stats.formats.get("srt"), Some(&2));
        assert_eq!(stats.formats.get("vtt"), Some(&1));
        assert_eq!(
            stats.size_distribution,
            SizeDistribution {
                small: 1,
                medium: 1,
                large: 1
            }
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_text(&[0xC3, 0x28]).is_none());
        assert_eq!(decode_text(b"abc").as_deref(), Some("abc"));
    }
}
