//! Tesseract engine
//!
//! Runs the `tesseract` command-line program. The image is staged as a
//! scratch PNG (system temp directory by default) which is removed when the
//! call returns, whatever the outcome.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use tokio::process::Command;

use super::engine::OcrEngine;
use super::types::{EngineError, Language, TokenConfidence};

/// Column index of `conf` in Tesseract's TSV output, used when the header is missing
const TSV_CONF_COLUMN: usize = 10;

/// Tesseract OCR engine
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    /// Binary name or path
    command: String,
    /// Where input images are staged
    scratch_dir: PathBuf,
}

impl TesseractEngine {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Stage input images in `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Installed language packs, as reported by `--list-langs`
    pub async fn list_languages(&self) -> Result<Vec<String>, EngineError> {
        let output = self.run(Command::new(&self.command).arg("--list-langs")).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_language_list(&stdout))
    }

    /// Language packs required by the catalog that are not installed
    pub async fn missing_languages(&self) -> Result<Vec<&'static str>, EngineError> {
        let installed = self.list_languages().await?;

        let mut missing: Vec<&'static str> = Language::ALL
            .iter()
            .flat_map(|lang| lang.packs())
            .filter(|pack| !installed.iter().any(|have| have == pack))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        Ok(missing)
    }

    async fn stage(&self, image: &RgbImage) -> Result<ScratchImage, EngineError> {
        ScratchImage::write(image, &self.scratch_dir).await
    }

    /// Run tesseract on a staged image, returning its stdout as text.
    ///
    /// `extra` is appended after the config flags (Tesseract config files
    /// such as `tsv` must come last).
    async fn run_on_image(
        &self,
        input: &ScratchImage,
        language: Language,
        config: &str,
        extra: Option<&str>,
    ) -> Result<String, EngineError> {
        let mut command = Command::new(&self.command);
        command
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language.code())
            .args(config.split_whitespace());
        if let Some(extra) = extra {
            command.arg(extra);
        }

        let output = self.run(&mut command).await?;

        String::from_utf8(output.stdout)
            .map_err(|e| EngineError::InvalidOutput(format!("Output is not UTF-8: {}", e)))
    }

    async fn run(&self, command: &mut Command) -> Result<Output, EngineError> {
        let output = command
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        self.run(Command::new(&self.command).arg("--version"))
            .await
            .is_ok()
    }

    async fn recognize(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<String, EngineError> {
        let input = self.stage(image).await?;
        self.run_on_image(&input, language, config, None).await
    }

    async fn recognize_structured(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<Vec<TokenConfidence>, EngineError> {
        let input = self.stage(image).await?;
        let tsv = self.run_on_image(&input, language, config, Some("tsv")).await?;
        parse_tsv_confidences(&tsv)
    }

    /// Both passes read the same staged PNG.
    async fn recognize_with_confidences(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<(String, Vec<TokenConfidence>), EngineError> {
        let input = self.stage(image).await?;
        let text = self.run_on_image(&input, language, config, None).await?;
        let tsv = self.run_on_image(&input, language, config, Some("tsv")).await?;
        Ok((text, parse_tsv_confidences(&tsv)?))
    }
}

/// PNG copy of an image on disk, deleted on drop
struct ScratchImage {
    path: PathBuf,
}

impl ScratchImage {
    async fn write(image: &RgbImage, dir: &Path) -> Result<Self, EngineError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| EngineError::ImagePreparation(format!("Failed to encode PNG: {}", e)))?;

        let path = dir.join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));
        let scratch = Self { path };

        tokio::fs::write(&scratch.path, &buffer).await.map_err(|e| {
            EngineError::ImagePreparation(format!("Failed to write temp file: {}", e))
        })?;

        Ok(scratch)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), "Failed to remove temp file: {}", e);
            }
        }
    }
}


/// Extract one confidence per data row from Tesseract TSV output.
///
/// Fractional confidences are truncated toward zero. Rows whose `conf`
/// field does not parse are an error; short rows are skipped.
fn parse_tsv_confidences(tsv: &str) -> Result<Vec<TokenConfidence>, EngineError> {
    let mut lines = tsv.lines();

    let conf_column = match lines.next() {
        Some(header) => header
            .split('\t')
            .position(|col| col.trim() == "conf")
            .unwrap_or(TSV_CONF_COLUMN),
        None => return Ok(Vec::new()),
    };

    let mut confidences = Vec::new();
    for row in lines {
        if row.trim().is_empty() {
            continue;
        }
        let Some(raw) = row.split('\t').nth(conf_column) else {
            continue;
        };
        let conf: f64 = raw.trim().parse().map_err(|_| {
            EngineError::InvalidOutput(format!("Unparseable confidence '{}'", raw))
        })?;
        confidences.push(TokenConfidence(conf.trunc() as i32));
    }

    Ok(confidences)
}

/// Parse `--list-langs` output: a header line followed by one pack per line.
fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t200\t80\t-1\t
2\t1\t1\t0\t0\t0\t10\t10\t180\t40\t-1\t
3\t1\t1\t1\t0\t0\t10\t10\t180\t40\t-1\t
4\t1\t1\t1\t1\t0\t10\t10\t180\t40\t-1\t
5\t1\t1\t1\t1\t1\t10\t10\t80\t40\t96.541\tHello
5\t1\t1\t1\t1\t2\t100\t10\t90\t40\t91\tworld
5\t1\t1\t1\t1\t3\t195\t10\t5\t40\t0\t
";

    #[test]
    fn test_parse_tsv_confidences() {
        let confidences = parse_tsv_confidences(SAMPLE_TSV).unwrap();
        let values: Vec<i32> = confidences.iter().map(|c| c.0).collect();
        assert_eq!(values, vec![-1, -1, -1, -1, 96, 91, 0]);
    }

    #[test]
    fn test_parse_tsv_conf_column_from_header() {
        let tsv = "text\tconf\nabc\t77\n";
        let values: Vec<i32> = parse_tsv_confidences(tsv)
            .unwrap()
            .iter()
            .map(|c| c.0)
            .collect();
        assert_eq!(values, vec![77]);
    }

    #[test]
    fn test_parse_tsv_empty_output() {
        assert!(parse_tsv_confidences("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tsv_bad_confidence() {
        let tsv = "level\tconf\n5\tabc\n";
        assert!(matches!(
            parse_tsv_confidences(tsv),
            Err(EngineError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_parse_language_list() {
        let output = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (3):\neng\nosd\nukr\n";
        assert_eq!(parse_language_list(output), vec!["eng", "osd", "ukr"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        assert!(!engine.is_available().await);

        let image = RgbImage::new(4, 4);
        let result = engine.recognize(&image, Language::English, "--oem 3 --psm 6").await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }

    fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_scratch_image_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::new(4, 4);

        let scratch = ScratchImage::write(&image, dir.path()).await.unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(image::open(&path).unwrap().to_rgb8(), image);

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_scratch_removed_after_failed_passes() {
        let dir = tempfile::tempdir().unwrap();
        let engine =
            TesseractEngine::new("/nonexistent/tesseract-binary").with_scratch_dir(dir.path());
        let image = RgbImage::new(4, 4);

        let result = engine
            .recognize_structured(&image, Language::English, "--oem 3 --psm 6")
            .await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
        assert_eq!(scratch_entries(dir.path()), 0);

        let result = engine
            .recognize_with_confidences(&image, Language::Ukrainian, "--oem 3 --psm 6")
            .await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_failed_scratch_write_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let engine = TesseractEngine::new("tesseract").with_scratch_dir(&missing);

        let result = engine
            .recognize(&RgbImage::new(4, 4), Language::English, "--oem 3 --psm 6")
            .await;
        assert!(matches!(result, Err(EngineError::ImagePreparation(_))));
        assert!(!missing.exists());
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    /// Stand-in binary that logs its input path and answers like tesseract
    #[cfg(unix)]
    fn fake_tesseract(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let log = dir.join("inputs.log");
        let script = dir.join("fake-tesseract");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 test -f \"$1\" || exit 2\n\
                 echo \"$1\" >> '{}'\n\
                 for last; do :; done\n\
                 if [ \"$last\" = tsv ]; then\n\
                 printf 'level\\tpage_num\\tblock_num\\tpar_num\\tline_num\\tword_num\\tleft\\ttop\\twidth\\theight\\tconf\\ttext\\n'\n\
                 printf '1\\t1\\t0\\t0\\t0\\t0\\t0\\t0\\t4\\t4\\t-1\\t\\n'\n\
                 printf '5\\t1\\t1\\t1\\t1\\t1\\t0\\t0\\t4\\t4\\t91.5\\thello\\n'\n\
                 else\n\
                 echo hello\n\
                 fi\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_both_passes_share_one_staged_image() {
        let bin_dir = tempfile::tempdir().unwrap();
        let scratch_dir = tempfile::tempdir().unwrap();
        let script = fake_tesseract(bin_dir.path());
        let engine = TesseractEngine::new(&script.to_string_lossy())
            .with_scratch_dir(scratch_dir.path());

        let (text, confidences) = engine
            .recognize_with_confidences(&RgbImage::new(4, 4), Language::English, "--oem 3 --psm 6")
            .await
            .unwrap();

        assert_eq!(text.trim(), "hello");
        assert_eq!(confidences, vec![TokenConfidence(-1), TokenConfidence(91)]);

        let log = std::fs::read_to_string(bin_dir.path().join("inputs.log")).unwrap();
        let inputs: Vec<&str> = log.lines().collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], inputs[1]);
        assert_eq!(scratch_entries(scratch_dir.path()), 0);
    }

    /// Draws "TEST" in block letters and runs the real engine.
    #[tokio::test]
    #[ignore = "requires tesseract with the eng language pack"]
    async fn test_recognizes_block_letters() {
        use image::Rgb;

        let mut image = RgbImage::from_pixel(420, 140, Rgb([255, 255, 255]));
        let mut fill = |x0: u32, y0: u32, w: u32, h: u32| {
            for x in x0..x0 + w {
                for y in y0..y0 + h {
                    image.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        };
        // T
        fill(30, 30, 60, 12);
        fill(54, 30, 12, 80);
        // E
        fill(110, 30, 12, 80);
        fill(110, 30, 50, 12);
        fill(110, 64, 40, 12);
        fill(110, 98, 50, 12);
        // S
        fill(180, 30, 60, 12);
        fill(180, 30, 12, 46);
        fill(180, 64, 60, 12);
        fill(228, 64, 12, 46);
        fill(180, 98, 60, 12);
        // T
        fill(260, 30, 60, 12);
        fill(284, 30, 12, 80);

        let engine = TesseractEngine::new("tesseract");
        let text = engine
            .recognize(&image, Language::English, "--oem 3 --psm 6")
            .await
            .unwrap();
        assert!(text.to_uppercase().contains("TEST"), "got {text:?}");
    }
}
