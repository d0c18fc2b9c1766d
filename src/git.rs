//! Thin wrappers around the system `git` command

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::Error;
use crate::version::{RevisionKind, RevisionRef};

/// Clone a repository at a specific revision
///
/// Branches and tags use a shallow clone. A `rev` pin needs the full history,
/// so it is cloned normally and then checked out detached.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub fn clone_at(url: &str, revision: &RevisionRef, target_dir: &Path) -> Result<(), Error> {
    // Remove target directory if it exists (git won't clone into existing non-empty dir)
    if target_dir.exists() {
        log::debug!("Removing stale checkout at {}", target_dir.display());
        fs::remove_dir_all(target_dir)?;
    }

    // Create parent directory if it doesn't exist
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut clone = Command::new("git");
    clone.arg("clone").arg("--quiet");
    if revision.kind != RevisionKind::Rev {
        clone.args(["--depth=1", "--branch", &revision.name]);
    }
    clone.arg(url).arg(target_dir);

    let output = clone.output().map_err(|e| Error::GitClone {
        url: url.to_string(),
        r#ref: revision.name.clone(),
        message: e.to_string(),
        hint: Some("Make sure git is installed and on PATH".to_string()),
    })?;

    if !output.status.success() {
        return Err(clone_failure(url, &revision.name, &output));
    }

    if revision.kind == RevisionKind::Rev {
        checkout_detached(target_dir, &revision.name)?;
    }

    Ok(())
}

fn checkout_detached(repo_dir: &Path, rev: &str) -> Result<(), Error> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["checkout", "--quiet", "--detach", rev])
        .output()
        .map_err(|e| Error::GitCommand {
            command: format!("checkout {}", rev),
            dir: repo_dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: format!("checkout {}", rev),
            dir: repo_dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

fn clone_failure(url: &str, ref_name: &str, output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    // Provide helpful error message for common failures
    let hint = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository (SSH key, credential helper \
             or personal access token)"
                .to_string(),
        )
    } else if stderr.contains("not found in upstream") || stderr.contains("Remote branch") {
        Some(format!(
            "'{}' does not exist upstream; check the pin in the dependency manifest",
            ref_name
        ))
    } else {
        None
    };

    Error::GitClone {
        url: url.to_string(),
        r#ref: ref_name.to_string(),
        message: stderr,
        hint,
    }
}
