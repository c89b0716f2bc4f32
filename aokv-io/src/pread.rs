//! Byte-source abstraction and a slice-backed adapter
//!
//! The reader engine is driven entirely by positioned reads; it never
//! assumes a `Read + Seek` stream. `ByteSource` is the seam: an application
//! plugs in a file handle, a memory map, or (as here) a plain byte slice,
//! and the reader engine never knows the difference. The callback must
//! tolerate short reads and reads past EOF and must never fail.

/// A positioned-read byte source.
///
/// `pread` returns up to `count` bytes starting at `offset`. Returning fewer
/// bytes than requested (a short read) or `None` (fully past EOF) are both
/// normal outcomes, not errors — callers treat either as truncation.
pub trait ByteSource {
    /// Read up to `count` bytes at `offset`.
    fn pread(&self, count: usize, offset: u64) -> Option<Vec<u8>>;

    /// Total length of the underlying byte source.
    fn len(&self) -> u64;

    /// Whether the byte source is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Adapts an in-memory byte slice (or owned buffer) to [`ByteSource`].
#[derive(Debug, Clone)]
pub struct SliceSource {
    bytes: Vec<u8>,
}

impl SliceSource {
    /// Wrap an owned buffer as a byte source.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for SliceSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl ByteSource for SliceSource {
    fn pread(&self, count: usize, offset: u64) -> Option<Vec<u8>> {
        let offset = usize::try_from(offset).ok()?;
        if offset >= self.bytes.len() {
            return None;
        }
        let end = offset.saturating_add(count).min(self.bytes.len());
        Some(self.bytes[offset..end].to_vec())
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Adapts any `Read + Seek` stream (typically [`std::fs::File`]) to [`ByteSource`].
///
/// Each `pread` call seeks and reads independently: calls are never
/// actually concurrent even though the trait itself makes no such promise.
pub struct FileSource<F> {
    file: std::cell::RefCell<F>,
    len: u64,
}

impl<F: std::io::Read + std::io::Seek> FileSource<F> {
    /// Wrap a seekable stream, determining its length up front.
    pub fn new(mut file: F) -> std::io::Result<Self> {
        let len = file.seek(std::io::SeekFrom::End(0))?;
        Ok(Self {
            file: std::cell::RefCell::new(file),
            len,
        })
    }
}

impl<F: std::io::Read + std::io::Seek> ByteSource for FileSource<F> {
    fn pread(&self, count: usize, offset: u64) -> Option<Vec<u8>> {
        if offset >= self.len {
            return None;
        }
        let mut file = self.file.borrow_mut();
        file.seek(std::io::SeekFrom::Start(offset)).ok()?;
        let mut buf = vec![0u8; count];
        let mut total_read = 0;
        loop {
            match file.read(&mut buf[total_read..]) {
                Ok(0) => break,
                Ok(n) => {
                    total_read += n;
                    if total_read == buf.len() {
                        break;
                    }
                }
                Err(_) => return if total_read == 0 { None } else {
                    buf.truncate(total_read);
                    Some(buf)
                },
            }
        }
        buf.truncate(total_read);
        Some(buf)
    }

    fn len(&self) -> u64 {
        self.len
    }
}
