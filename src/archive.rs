//! Project archives
//!
//! Azkaban expects projects as a zip of the project directory. The archive
//! is a scoped resource: [`ProjectArchive`] deletes its file when dropped,
//! so it disappears on every exit path of an upload.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::{Error, Result};

/// A zip archive on disk, removed on drop
#[derive(Debug)]
pub struct ProjectArchive {
    path: PathBuf,
}

impl ProjectArchive {
    /// Zip the directory `source` into `<out_dir>/<zip_name>.zip`
    ///
    /// Entries are stored relative to `source`. If writing fails half way
    /// the partial file is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if `source` is not a directory, if
    /// `<zip_name>.zip` already exists in `out_dir` (it is left untouched), or
    /// if the zip cannot be written
    pub fn create(source: &Path, zip_name: &str, out_dir: &Path) -> Result<Self> {
        if !source.is_dir() {
            return Err(Error::Archive(format!(
                "no such directory: '{}'",
                source.display()
            )));
        }

        let path = out_dir.join(format!("{zip_name}.zip"));
        let file = File::create_new(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                Error::Archive(format!("'{}' already exists", path.display()))
            } else {
                Error::Archive(format!("failed to create '{}': {e}", path.display()))
            }
        })?;

        // From here on the guard owns the file; an early return removes it.
        let archive = Self { path };
        let own_path = fs::canonicalize(&archive.path)?;

        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut count = 0_usize;
        add_dir(&mut writer, options, source, "", &own_path, &mut count)?;

        writer
            .finish()
            .map_err(|e| Error::Archive(format!("failed to finish archive: {e}")))?;

        tracing::debug!(
            path = %archive.path.display(),
            entries = count,
            "created project archive"
        );

        Ok(archive)
    }

    /// Location of the zip file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectArchive {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed project archive"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove project archive"
            ),
        }
    }
}

/// Recursively add `dir` under the `prefix` entry name
fn add_dir(
    writer: &mut ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    dir: &Path,
    prefix: &str,
    skip: &Path,
    count: &mut usize,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let entry_path = entry.path();
        let name = format!("{prefix}{}", entry.file_name().to_string_lossy());

        // `DirEntry::file_type` does not follow symlinks
        let file_type = entry.file_type()?;
        let is_link = file_type.is_symlink();
        let is_dir = if is_link {
            match fs::metadata(&entry_path) {
                Ok(meta) => meta.is_dir(),
                Err(e) => {
                    tracing::debug!(
                        path = %entry_path.display(),
                        error = %e,
                        "skipping dangling symlink"
                    );
                    continue;
                }
            }
        } else {
            file_type.is_dir()
        };

        if is_dir {
            writer
                .add_directory(format!("{name}/"), options)
                .map_err(|e| Error::Archive(format!("failed to add '{name}/': {e}")))?;
            // A linked directory is recorded but never descended into, so a
            // link to an ancestor cannot loop
            if is_link {
                tracing::debug!(path = %entry_path.display(), "not following directory symlink");
            } else {
                add_dir(writer, options, &entry_path, &format!("{name}/"), skip, count)?;
            }
        } else {
            // Archiving the current directory would otherwise swallow the archive itself
            if fs::canonicalize(&entry_path).is_ok_and(|p| p == skip) {
                continue;
            }
            writer
                .start_file(name.clone(), options)
                .map_err(|e| Error::Archive(format!("failed to add '{name}': {e}")))?;
            let mut source = File::open(&entry_path)?;
            io::copy(&mut source, writer)?;
        }
        *count += 1;
    }

    Ok(())
}

/// Default project name: the last component of the absolute form of `path`
///
/// `.` and `..` are resolved lexically, so `/tmp/myproj/..` names `tmp`.
///
/// # Errors
///
/// Returns [`Error::Archive`] if the path has no final component (e.g. `/`)
pub fn default_project_name(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    normalized
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Archive(format!(
                "cannot derive a project name from '{}'",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn sample_project(root: &Path) -> PathBuf {
        let project = root.join("myproj");
        fs::create_dir_all(project.join("lib")).unwrap();
        fs::write(project.join("basic.flow"), "nodes:\n  - name: hello\n").unwrap();
        fs::write(project.join("lib").join("job.sh"), "echo hi\n").unwrap();
        project
    }

    #[test]
    fn test_default_project_name() {
        assert_eq!(
            default_project_name(Path::new("/tmp/myproj")).unwrap(),
            "myproj"
        );
        assert_eq!(
            default_project_name(Path::new("/tmp/myproj/")).unwrap(),
            "myproj"
        );
        assert_eq!(
            default_project_name(Path::new("/tmp/myproj/sub/..")).unwrap(),
            "myproj"
        );
        assert!(default_project_name(Path::new("/")).is_err());
    }

    #[test]
    fn test_create_and_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let project = sample_project(tmp.path());
        let out = tempfile::tempdir().unwrap();

        let archive = ProjectArchive::create(&project, "bundle", out.path()).unwrap();
        let zip_path = archive.path().to_path_buf();
        assert_eq!(zip_path, out.path().join("bundle.zip"));

        let mut zip = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(ToString::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["basic.flow", "lib/", "lib/job.sh"]);

        let mut contents = String::new();
        zip.by_name("lib/job.sh")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "echo hi\n");

        drop(archive);
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_missing_source_leaves_nothing() {
        let out = tempfile::tempdir().unwrap();
        let err =
            ProjectArchive::create(&out.path().join("nope"), "nope", out.path()).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
        assert!(!out.path().join("nope.zip").exists());
    }

    #[test]
    fn test_archive_inside_source_skips_itself() {
        let tmp = tempfile::tempdir().unwrap();
        let project = sample_project(tmp.path());

        let archive = ProjectArchive::create(&project, "myproj", &project).unwrap();
        let zip = zip::ZipArchive::new(File::open(archive.path()).unwrap()).unwrap();
        assert!(zip.file_names().all(|n| n != "myproj.zip"));
    }

    #[test]
    fn test_existing_zip_is_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let project = sample_project(tmp.path());
        let out = tempfile::tempdir().unwrap();
        let existing = out.path().join("bundle.zip");
        fs::write(&existing, "keep me").unwrap();

        let err = ProjectArchive::create(&project, "bundle", out.path()).unwrap_err();
        assert!(matches!(err, Error::Archive(ref m) if m.contains("already exists")));
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().unwrap();
        let project = sample_project(tmp.path());
        symlink("..", project.join("up")).unwrap();
        symlink("basic.flow", project.join("alias.flow")).unwrap();
        symlink("missing", project.join("dangling")).unwrap();
        let out = tempfile::tempdir().unwrap();

        let archive = ProjectArchive::create(&project, "bundle", out.path()).unwrap();
        let mut zip = zip::ZipArchive::new(File::open(archive.path()).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(ToString::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["alias.flow", "basic.flow", "lib/", "lib/job.sh", "up/"]
        );

        let mut contents = String::new();
        zip.by_name("alias.flow")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "nodes:\n  - name: hello\n");
    }
}
