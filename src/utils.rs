// src/utils.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Directory-safe key for an account email.
///
/// ASCII letters, digits and `-` are kept; every other byte becomes `_xx` (lowercase hex).
/// Distinct emails always get distinct directories, and no key contains `.` or a separator.
pub fn owner_dir_name(owner: &str) -> String {
    if owner.is_empty() {
        return "_".to_string();
    }

    let mut name = String::with_capacity(owner.len());
    for byte in owner.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("_{:02x}", byte));
        }
    }
    name
}

/// Filename fragment made of alphanumerics and underscores only
pub fn sanitize_filename(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

pub async fn read_file_safe(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

pub async fn write_file_safe(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent).await?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_owner_dir_name() {
        assert_eq!(owner_dir_name("ada@example.com"), "ada_40example_2ecom");
        assert_eq!(owner_dir_name("jean-paul@x.fr"), "jean-paul_40x_2efr");
        assert_eq!(owner_dir_name("../../etc"), "_2e_2e_2f_2e_2e_2fetc");
        assert_eq!(owner_dir_name(""), "_");
    }

    #[test]
    fn test_owner_dir_name_keeps_emails_apart() {
        let emails = [
            "ada+x@example.com",
            "ada-x@example.com",
            "ada_x@example.com",
            "ada.x@example.com",
            "Ada-x@example.com",
            "ada_2bx@example.com",
        ];
        let names: std::collections::HashSet<String> =
            emails.iter().map(|e| owner_dir_name(e)).collect();
        assert_eq!(names.len(), emails.len());
    }

    proptest! {
        #[test]
        fn prop_owner_dir_name_is_injective(a in "\\PC{0,12}", b in "\\PC{0,12}") {
            prop_assume!(a != b);
            prop_assert_ne!(owner_dir_name(&a), owner_dir_name(&b));
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Ada Lovelace"), "Ada_Lovelace");
        assert_eq!(sanitize_filename("  José  O'Neil "), "José_ONeil");
        assert_eq!(sanitize_filename("../x"), "x");
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/srv/app");
        assert_eq!(
            resolve_path(base, Path::new("data")),
            PathBuf::from("/srv/app/data")
        );
        assert_eq!(
            resolve_path(base, Path::new("/tmp/x")),
            PathBuf::from("/tmp/x")
        );
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("file.txt");
        write_file_safe(&path, b"hello").await.unwrap();
        assert_eq!(read_file_safe(&path).await.unwrap(), "hello");
    }
}
