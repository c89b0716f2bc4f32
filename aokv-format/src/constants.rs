//! Constants and magic numbers for the AOKV format

/// Brand shared by every block's first magic word: the ASCII bytes `AOKV` read
/// as a little-endian `u32`.
pub const MAGIC0: u32 = 0x564B4F41;

/// Base value of the second magic word for KVP blocks; `MAGIC1 = KVP_BASE + fileId`.
pub const KVP_BASE: u32 = 0x93C1AF97;

/// Base value of the second magic word for Index blocks; `MAGIC1 = INDEX_BASE + fileId`.
pub const INDEX_BASE: u32 = 0x93C1AF98;

/// Inclusive upper bound of the reserved window for `fileId`-offset matching.
///
/// Any `MAGIC1` value up to and including this one is considered "within the
/// AOKV reserved window" even if it doesn't resolve to a known block type for
/// the reader's configured `fileId` — see the forward-compatible skip rule in
/// the reader engine.
pub const RESERVED_WINDOW_MAX: u32 = 0x93C1B097;

/// Size in bytes of the shared `MagicHeader` (`MAGIC0`, `MAGIC1`, `BLOCK_SIZE`).
pub const MAGIC_HEADER_LEN: usize = 12;

/// Size in bytes of a `KvpHeader` (`MagicHeader` plus `KEY_SIZE`).
pub const KVP_HEADER_LEN: usize = 16;

/// Size in bytes of an `IndexHeader` (just the `MagicHeader`).
pub const INDEX_HEADER_LEN: usize = MAGIC_HEADER_LEN;

/// Size in bytes of the trailing `Footer` (`BACK_DISTANCE`).
pub const FOOTER_LEN: usize = 4;

/// Probe byte offset within a KVP body: byte 4 (right after the `u32 descSz`
/// prefix) is `{` (`0x7B`) iff the body is uncompressed.
pub const BODY_PROBE_OFFSET: usize = 4;

/// Probe byte offset within Index content: byte 0 is `{` iff uncompressed,
/// since the index content is always a bare JSON object.
pub const INDEX_PROBE_OFFSET: usize = 0;

/// The probe byte value that marks "uncompressed" — the ASCII `{`.
pub const UNCOMPRESSED_PROBE_BYTE: u8 = 0x7B;

/// Threshold (in bytes since the last Index block) past which a snapshot is
/// forced regardless of amortization, keeping back-pointers within `u32`.
pub const FORCE_SNAPSHOT_DISTANCE: u64 = 1 << 30;

/// Minimum accumulated KVP bytes since the last snapshot before amortized
/// snapshotting is even considered.
pub const SNAPSHOT_MIN_KVP_BYTES: u64 = 1 << 16;

/// Amortization factor: a new snapshot is taken once KVP bytes written since
/// the last snapshot are at least this multiple of the last snapshot's size.
pub const SNAPSHOT_AMORTIZATION_FACTOR: u64 = 64;
