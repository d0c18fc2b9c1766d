//! # Upstream Checkouts
//!
//! This module owns the disposable checkout of the upstream repository that
//! definitions are mirrored from.
//!
//! ## Design
//!
//! The fetch step is hidden behind the **`UpstreamProvider`** trait so the
//! pipeline never shells out to `git` directly. `GitUpstream` is the real
//! implementation; tests substitute providers that copy a fixture tree into
//! place, or that fail on purpose.
//!
//! A fetched tree is represented by a **`Checkout`**, a scoped guard over the
//! checkout directory. Dropping a `Checkout` removes the directory, so the
//! checkout is released on every exit path of a run (success or any error),
//! not only when the pipeline reaches its final stage. `release` does the
//! same removal explicitly and reports failures instead of logging them.

use crate::error::{Error, Result};
use crate::version::RevisionRef;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of upstream checkouts - allows substituting the network in tests
pub trait UpstreamProvider {
    /// Materializes a fresh checkout at `revision`.
    ///
    /// Implementations must remove any stale checkout at their destination
    /// first and must return an error when the fetch did not succeed.
    fn fetch(&self, revision: &RevisionRef) -> Result<Checkout>;

    /// Removes a checkout previously returned by `fetch`.
    fn release(&self, checkout: Checkout) -> Result<()> {
        checkout.release()
    }
}

/// An upstream tree on disk, removed when dropped
#[derive(Debug)]
pub struct Checkout {
    root: PathBuf,
    revision: RevisionRef,
    released: bool,
}

impl Checkout {
    /// Takes ownership of the directory at `root`.
    pub fn new(root: PathBuf, revision: RevisionRef) -> Self {
        Self {
            root,
            revision,
            released: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn revision(&self) -> &RevisionRef {
        &self.revision
    }

    /// Removes the checkout directory, reporting any failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        remove_tree(&self.root)
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            log::warn!(
                "Failed to remove upstream checkout {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

fn remove_tree(root: &Path) -> Result<()> {
    if root.exists() {
        log::debug!("Removing upstream checkout {}", root.display());
        fs::remove_dir_all(root).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove checkout '{}': {}", root.display(), e),
        })?;
    }
    Ok(())
}

/// The default provider, which clones with the system `git` command.
pub struct GitUpstream {
    url: String,
    destination: PathBuf,
}

impl GitUpstream {
    pub fn new(url: impl Into<String>, destination: PathBuf) -> Self {
        Self {
            url: url.into(),
            destination,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl UpstreamProvider for GitUpstream {
    fn fetch(&self, revision: &RevisionRef) -> Result<Checkout> {
        log::info!(
            "Fetching {} at {} into {}",
            self.url,
            revision,
            self.destination.display()
        );
        let checkout = Checkout::new(self.destination.clone(), revision.clone());
        // A partial clone is removed by the guard when this fails.
        crate::git::clone_at(&self.url, revision, &self.destination)?;
        Ok(checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::RevisionKind;
    use tempfile::TempDir;

    struct FixtureUpstream {
        destination: PathBuf,
    }

    impl UpstreamProvider for FixtureUpstream {
        fn fetch(&self, revision: &RevisionRef) -> Result<Checkout> {
            fs::create_dir_all(self.destination.join("src"))?;
            fs::write(self.destination.join("src/lib.rs"), "// fixture")?;
            Ok(Checkout::new(self.destination.clone(), revision.clone()))
        }
    }

    fn tag() -> RevisionRef {
        RevisionRef::new(RevisionKind::Tag, "v1.0.0")
    }

    #[test]
    fn test_checkout_removed_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("checkout");
        let provider = FixtureUpstream {
            destination: destination.clone(),
        };

        {
            let checkout = provider.fetch(&tag()).unwrap();
            assert!(checkout.root().join("src/lib.rs").exists());
            assert_eq!(checkout.revision(), &tag());
        }

        assert!(!destination.exists());
    }

    #[test]
    fn test_release_removes_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("checkout");
        let provider = FixtureUpstream {
            destination: destination.clone(),
        };

        let checkout = provider.fetch(&tag()).unwrap();
        provider.release(checkout).unwrap();
        assert!(!destination.exists());
    }

    #[test]
    fn test_release_of_missing_directory_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let checkout = Checkout::new(temp_dir.path().join("never-created"), tag());
        checkout.release().unwrap();
    }

    #[test]
    fn test_git_upstream_failed_fetch_leaves_no_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("checkout");
        let upstream = GitUpstream::new(
            temp_dir.path().join("no-such-repo").display().to_string(),
            destination.clone(),
        );

        let result = upstream.fetch(&tag());
        assert!(matches!(result, Err(Error::GitClone { .. })));
        assert!(!destination.exists());
    }
}
