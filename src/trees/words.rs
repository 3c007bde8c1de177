//! Bit-packed node words.
//!
//! Every compact encoding stores nodes as fixed-width `u32` words with fields
//! sharing a word. The bit positions are an interop contract with existing
//! model files and encoders; each packing lives in one small struct with
//! named accessors instead of shift expressions scattered through traversal.

/// On-disk split index word: bit 31 is the default-left flag, bits 0..31 hold
/// the feature index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitIndex(u32);

impl SplitIndex {
    const FEATURE_MASK: u32 = (1 << 31) - 1;

    /// Wrap a raw `sindex` word as read from the stream.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Pack a feature index and default direction.
    #[inline]
    pub const fn new(feature_index: u32, default_left: bool) -> Self {
        Self((feature_index & Self::FEATURE_MASK) | ((default_left as u32) << 31))
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Feature index (low 31 bits).
    #[inline]
    pub const fn feature_index(self) -> u32 {
        self.0 & Self::FEATURE_MASK
    }

    /// Whether missing values branch left.
    #[inline]
    pub const fn default_left(self) -> bool {
        (self.0 >> 31) != 0
    }
}

/// Encoded split word: `(feature_index << 1) | default_bit`, where a zero
/// default bit sends missing values to the left (adjacent) branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitWord(u32);

impl SplitWord {
    /// Pack a feature index and default direction.
    #[inline]
    pub const fn new(feature_index: u32, default_left: bool) -> Self {
        Self((feature_index << 1) | (!default_left as u32))
    }

    /// Wrap a raw encoded word.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Feature index (high 31 bits).
    #[inline]
    pub const fn feature_index(self) -> u32 {
        self.0 >> 1
    }

    /// Whether missing values branch left.
    #[inline]
    pub const fn default_left(self) -> bool {
        (self.0 & 1) == 0
    }

    /// Same word with the default direction inverted. Used when repacking
    /// exchanges a node's children, since the default bit is defined relative
    /// to the physical layout.
    #[inline]
    pub const fn flipped(self) -> Self {
        Self(self.0 ^ 1)
    }
}

/// Branch word of the repacked layout: zero marks a leaf, otherwise
/// `(offset_to_rare_child << 1) | swapped_bit`.
///
/// The swapped bit records that the original left/right children were
/// exchanged so the higher-coverage child could take the adjacent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchWord(u32);

impl BranchWord {
    /// Leaf marker.
    pub const LEAF: Self = Self(0);

    /// Placeholder written during the first encoding pass, before the rare
    /// child's final offset is known. The high bit keeps the word nonzero so
    /// it cannot be mistaken for a leaf.
    #[inline]
    pub const fn pending(swapped: bool) -> Self {
        Self(0b10 | swapped as u32)
    }

    /// Final word carrying the rare child's word offset from its parent.
    #[inline]
    pub const fn with_offset(offset: usize, swapped: bool) -> Self {
        Self(((offset as u32) << 1) | swapped as u32)
    }

    /// Wrap a raw encoded word.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether this word marks a leaf.
    #[inline]
    pub const fn is_leaf(self) -> bool {
        self.0 == 0
    }

    /// Whether the children were exchanged during repacking.
    #[inline]
    pub const fn swapped(self) -> bool {
        (self.0 & 1) == 1
    }

    /// Word offset from the parent to the rare child.
    #[inline]
    pub const fn offset(self) -> usize {
        (self.0 >> 1) as usize
    }
}

/// Child word of the narrow layout: `(left_id << 16) | right_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildPair(u32);

impl ChildPair {
    /// Pack two 16-bit child ids.
    #[inline]
    pub const fn new(left: u16, right: u16) -> Self {
        Self(((left as u32) << 16) | right as u32)
    }

    /// Wrap a raw encoded word.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Left child id.
    #[inline]
    pub const fn left(self) -> u32 {
        self.0 >> 16
    }

    /// Right child id.
    #[inline]
    pub const fn right(self) -> u32 {
        self.0 & 0xFFFF
    }
}

/// Tag word of the narrow layout: value `2` marks a leaf; bit 0 of a split
/// tag marks default-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTag(u32);

impl NodeTag {
    /// Leaf marker.
    pub const LEAF: Self = Self(2);

    /// Split tag carrying the default direction.
    #[inline]
    pub const fn split(default_left: bool) -> Self {
        Self(default_left as u32)
    }

    /// Wrap a raw encoded word.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether this word marks a leaf.
    #[inline]
    pub const fn is_leaf(self) -> bool {
        self.0 == 2
    }

    /// Whether missing values branch left.
    #[inline]
    pub const fn default_left(self) -> bool {
        (self.0 & 1) == 1
    }
}
