use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use semver::Version;
use sha2::{Digest, Sha256};

use super::{InstallError, Installer};

const HASHICORP_RELEASES_BASE: &str = "https://releases.hashicorp.com";
const PRODUCT: &str = "terraform";

/// Release platform naming as used by HashiCorp (`linux_amd64`, `darwin_arm64`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub fn current() -> Result<Self, InstallError> {
        Self::from_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_target(os: &str, arch: &str) -> Result<Self, InstallError> {
        let unsupported = || InstallError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let release_os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            "windows" => "windows",
            "freebsd" => "freebsd",
            "openbsd" => "openbsd",
            "solaris" => "solaris",
            _ => return Err(unsupported()),
        };
        let release_arch = match arch {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "arm" => "arm",
            _ => return Err(unsupported()),
        };

        Ok(Self {
            os: release_os,
            arch: release_arch,
        })
    }

    fn binary_name(&self) -> &'static str {
        if self.os == "windows" {
            "terraform.exe"
        } else {
            "terraform"
        }
    }
}

/// Installs exact Terraform versions from the HashiCorp release archive.
///
/// Binaries are cached under `<install_dir>/terraform/<version>/`; a cached
/// binary is returned without touching the network.
#[derive(Debug, Clone)]
pub struct ReleasesInstaller {
    client: reqwest::Client,
    base_url: String,
    install_dir: PathBuf,
    platform: Platform,
}

impl ReleasesInstaller {
    pub fn new(install_dir: impl Into<PathBuf>) -> Result<Self, InstallError> {
        Self::with_base_url(HASHICORP_RELEASES_BASE.to_string(), install_dir)
    }

    /// Downloads releases from `base_url` instead of releases.hashicorp.com.
    pub fn with_base_url(
        base_url: String,
        install_dir: impl Into<PathBuf>,
    ) -> Result<Self, InstallError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("provisioner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            install_dir: install_dir.into(),
            platform: Platform::current()?,
        })
    }

    /// Uses the per-user cache directory.
    pub fn in_user_cache() -> Result<Self, InstallError> {
        let dir = dirs::cache_dir().ok_or(InstallError::NoInstallDir)?;
        Self::new(dir.join("provisioner"))
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    fn version_dir(&self, version: &Version) -> PathBuf {
        self.install_dir.join(PRODUCT).join(version.to_string())
    }

    fn archive_name(&self, version: &Version) -> String {
        format!(
            "{}_{}_{}_{}.zip",
            PRODUCT, version, self.platform.os, self.platform.arch
        )
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, InstallError> {
        tracing::debug!(%url, "downloading");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn expected_checksum(
        &self,
        version: &Version,
        archive: &str,
    ) -> Result<String, InstallError> {
        let url = format!(
            "{}/{}/{}/{}_{}_SHA256SUMS",
            self.base_url, PRODUCT, version, PRODUCT, version
        );
        let sums = self.fetch(&url).await?.text().await?;
        find_checksum(&sums, archive).ok_or_else(|| InstallError::ChecksumMissing {
            file: archive.to_string(),
        })
    }
}

#[async_trait]
impl Installer for ReleasesInstaller {
    async fn install(&self, version: &Version) -> Result<PathBuf, InstallError> {
        let dir = self.version_dir(version);
        let binary = dir.join(self.platform.binary_name());

        if binary.is_file() {
            tracing::info!(%version, path = %binary.display(), "using cached terraform");
            return Ok(std::path::absolute(&binary)?);
        }

        let archive = self.archive_name(version);
        let expected = self.expected_checksum(version, &archive).await?;

        let url = format!("{}/{}/{}/{}", self.base_url, PRODUCT, version, archive);
        let bytes = self.fetch(&url).await?.bytes().await?;

        let actual = hex::encode(Sha256::digest(&bytes));
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(InstallError::ChecksumMismatch {
                file: archive,
                expected,
                actual,
            });
        }

        let name = self.platform.binary_name();
        let target = binary.clone();
        tokio::task::spawn_blocking(move || extract_binary(&bytes, name, &target))
            .await
            .map_err(std::io::Error::other)??;

        tracing::info!(%version, path = %binary.display(), "terraform installed");
        Ok(std::path::absolute(&binary)?)
    }
}

/// Finds `file` in a `sha256sum`-style listing.
fn find_checksum(sums: &str, file: &str) -> Option<String> {
    sums.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?;
        (name == file).then(|| digest.to_string())
    })
}

/// Extracts `name` from the zip into `target`, via a temp file renamed into place.
fn extract_binary(archive: &[u8], name: &str, target: &Path) -> Result<(), InstallError> {
    let dir = target
        .parent()
        .ok_or_else(|| std::io::Error::other("install target has no parent directory"))?;
    std::fs::create_dir_all(dir)?;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut entry = zip.by_name(name)?;
    let mut contents = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut contents)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&contents)?;
    tmp.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o755))?;
    }

    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
