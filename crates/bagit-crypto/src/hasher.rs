use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bagit_types::HashAlgorithm;
use digest::DynDigest;

const BUFFER_SIZE: usize = 64 * 1024;

/// Computes hex digests for one manifest algorithm.
///
/// Every digest is returned as lowercase hex, the form manifests store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHasher {
    algorithm: HashAlgorithm,
}

impl FileHasher {
    /// Hasher for the default manifest algorithm.
    pub const DEFAULT: Self = Self {
        algorithm: HashAlgorithm::DEFAULT,
    };

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this hasher computes.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash an in-memory buffer.
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        let mut digest = self.digest();
        digest.update(data);
        hex::encode(digest.finalize())
    }

    /// Hash everything readable from `reader`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut digest = self.digest();
        let mut buf = vec![0u8; BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            digest.update(&buf[..n]);
        }
        Ok(hex::encode(digest.finalize()))
    }

    /// Hash the contents of a file.
    pub fn hash_file(&self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        self.hash_reader(BufReader::new(file))
    }

    /// Check a file against an expected digest (hex case is ignored).
    pub fn verify_file(&self, path: &Path, expected: &str) -> io::Result<bool> {
        Ok(self.hash_file(path)?.eq_ignore_ascii_case(expected.trim()))
    }

    fn digest(&self) -> Box<dyn DynDigest> {
        match self.algorithm {
            HashAlgorithm::Md5 => Box::new(md5::Md5::default()),
            HashAlgorithm::Sha1 => Box::new(sha1::Sha1::default()),
            HashAlgorithm::Sha224 => Box::new(sha2::Sha224::default()),
            HashAlgorithm::Sha256 => Box::new(sha2::Sha256::default()),
            HashAlgorithm::Sha384 => Box::new(sha2::Sha384::default()),
            HashAlgorithm::Sha512 => Box::new(sha2::Sha512::default()),
        }
    }
}

impl From<HashAlgorithm> for FileHasher {
    fn from(algorithm: HashAlgorithm) -> Self {
        Self::new(algorithm)
    }
}
