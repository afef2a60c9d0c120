//! Fixtures shared by unit tests: sized files and shell scripts standing in for pngquant.

use std::path::{Path, PathBuf};

/// Write a file of `size` zero bytes
pub fn write_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; size]).unwrap();
    path
}

/// Write an executable `/bin/sh` script
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A stand-in for pngquant.
///
/// Prints the quality and source path on stdout and a verbose banner on
/// stderr. Files whose name ends in `a.png` get a 400 byte `-fs8` artifact
/// and exit 0; everything else exits 98 without an artifact, like pngquant
/// does when the result would be larger than the original.
#[cfg(unix)]
pub fn fake_pngquant(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "pngquant",
        r#"if [ "$#" -eq 0 ]; then
  echo "pngquant, 2.17.0 (January 2022), by Kornel Lesinski" >&2
  exit 1
fi
for last; do :; done
echo "quality $3 $last"
echo "$last:" >&2
echo "  read file" >&2
case "$last" in
  *a.png) head -c 400 /dev/zero > "${last%.png}-fs8.png"; exit 0 ;;
  *) exit 98 ;;
esac
"#,
    )
}
