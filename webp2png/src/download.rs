//! Download sinks: where finished artifacts end up

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::error::Result;

pub trait DownloadSink {
    fn save(&mut self, file_name: &str, artifact: &Artifact) -> Result<()>;
}

impl<S: DownloadSink + ?Sized> DownloadSink for &mut S {
    fn save(&mut self, file_name: &str, artifact: &Artifact) -> Result<()> {
        (**self).save(file_name, artifact)
    }
}

/// Writes each artifact into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Only the final component of `file_name` is kept
    pub fn target(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download.png".into());
        self.dir.join(name)
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, artifact: &Artifact) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.target(file_name);
        fs::write(&path, artifact.data())?;

        log::info!("Saved {} ({} bytes)", path.display(), artifact.len());
        Ok(())
    }
}

/// Writes `name<TAB>data-url` lines
#[derive(Debug)]
pub struct DataUrlSink<W> {
    writer: W,
}

impl<W: Write> DataUrlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DownloadSink for DataUrlSink<W> {
    fn save(&mut self, file_name: &str, artifact: &Artifact) -> Result<()> {
        writeln!(self.writer, "{file_name}\t{}", artifact.data_url())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps downloads in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub downloads: Vec<(String, Artifact)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, file_name: &str, artifact: &Artifact) -> Result<()> {
        self.downloads.push((file_name.to_string(), artifact.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PngCompression;
    use crate::surface::Surface;

    fn artifact() -> Artifact {
        Artifact::from_surface(&Surface::new(2, 2), PngCompression::Fast)
            .unwrap()
            .into_download()
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        let artifact = artifact();

        sink.save("cat.webp.png", &artifact).unwrap();

        let written = fs::read(dir.path().join("out").join("cat.webp.png")).unwrap();
        assert_eq!(written, artifact.data());
    }

    #[test]
    fn directory_sink_stays_inside_dir() {
        let sink = DirectorySink::new("/tmp/out");
        assert_eq!(sink.target("../../etc/x.png"), PathBuf::from("/tmp/out/x.png"));
        assert_eq!(sink.target(".."), PathBuf::from("/tmp/out/download.png"));
    }

    #[test]
    fn data_url_sink_writes_one_line() {
        let mut sink = DataUrlSink::new(Vec::new());
        sink.save("a.png", &artifact()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("a.png\tdata:application/octet-stream;base64,"));
        assert_eq!(output.lines().count(), 1);
    }
}
