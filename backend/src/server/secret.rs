//! Token signing secret loading and fingerprinting.
//!
//! The secret is read from a file (typically a mounted orchestrator secret).
//! Debug builds, or deployments that opt in, fall back to a random secret
//! when the file is unreadable; tokens signed by other processes will then
//! not verify. A truncated SHA-256 fingerprint lets operators confirm which
//! secret is active without exposing it.

use std::path::{Path, PathBuf};

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

/// Minimum secret length accepted in release builds (256 bits).
pub const TOKEN_SECRET_MIN_LEN: usize = 32;
/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing or short secrets.
    Debug,
    /// Release builds require a readable secret of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the token secret.
#[derive(thiserror::Error, Debug)]
pub enum SecretError {
    /// Reading the secret file failed and no fallback is permitted.
    #[error("failed to read token secret at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret exists but is too short for release builds.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Shared secret used to verify HS256 bearer tokens.
///
/// The bytes are wiped from memory when dropped.
pub struct TokenSecret {
    bytes: Zeroizing<Vec<u8>>,
    ephemeral: bool,
}

impl TokenSecret {
    /// Wrap explicit secret bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes.into()),
            ephemeral: false,
        }
    }

    /// Random secret for local development.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; TOKEN_SECRET_MIN_LEN * 2]);
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            bytes,
            ephemeral: true,
        }
    }

    /// Load the secret at `path`.
    ///
    /// Surrounding ASCII whitespace (such as a trailing newline) is ignored.
    /// When the file cannot be read, debug builds and `allow_ephemeral`
    /// deployments receive a generated secret instead.
    ///
    /// # Errors
    /// [`SecretError::Read`] when the file is unreadable and no fallback is
    /// permitted; [`SecretError::TooShort`] for short secrets in release
    /// builds.
    pub fn load(path: &Path, mode: BuildMode, allow_ephemeral: bool) -> Result<Self, SecretError> {
        match std::fs::read(path) {
            Ok(raw) => {
                let raw = Zeroizing::new(raw);
                let secret = Self::from_bytes(raw.trim_ascii());
                let length = secret.bytes.len();
                if mode == BuildMode::Release && length < TOKEN_SECRET_MIN_LEN {
                    return Err(SecretError::TooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len: TOKEN_SECRET_MIN_LEN,
                    });
                }
                Ok(secret)
            }
            Err(error) => {
                if mode.is_debug() || allow_ephemeral {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "using temporary token secret (dev only)"
                    );
                    Ok(Self::generate())
                } else {
                    Err(SecretError::Read {
                        path: path.to_path_buf(),
                        source: error,
                    })
                }
            }
        }
    }

    /// Secret bytes for the token verifier.
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the secret was generated rather than loaded.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// First 8 bytes of the secret's SHA-256 digest as 16 hex characters.
    ///
    /// # Examples
    /// ```
    /// use users_api::server::TokenSecret;
    ///
    /// let fp = TokenSecret::from_bytes(b"secret".to_vec()).fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes.as_slice());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}
