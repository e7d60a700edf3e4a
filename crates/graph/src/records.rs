//! Packed views of the external binary's structures.
//!
//! Offsets are a compatibility contract with a specific foreign binary: if
//! that binary's layout shifts, these reads silently produce garbage, which
//! is why every consumer bounds-checks and falls back to "unavailable"
//! instead of trusting the decoded values.

use atlas_memory::{ForeignVec, FromMemory, RemoteReader};
use std::mem;

/// Integer grid slot of a node, independent of screen pixels.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

unsafe impl FromMemory for GridPos {}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// A zero-valued connection slot means "no connection".
    pub fn is_zero(&self) -> bool {
        let (x, y) = (self.x, self.y);
        x == 0 && y == 0
    }
}

/// Packed float pair used inside UI element records.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug)]
pub struct PackedVec2 {
    pub x: f32,
    pub y: f32,
}

unsafe impl FromMemory for PackedVec2 {}

/// Visibility bit inside [`UiElementFrame::flags`].
pub const FLAG_VISIBLE: u32 = 0x08;
/// "Apply the position modifier while resolving position" bit.
pub const FLAG_POSITION_MODIFIER: u32 = 0x400;

/// One element of the foreign UI hierarchy.
///
/// Only the fields this pipeline consumes are named; everything else is
/// opaque padding. `self_addr` is the element's own address as the foreign
/// process recorded it, used to detect self-referential parent chains.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct UiElementFrame {
    _pad0: [u8; 0x28],
    /// 0x028
    pub self_addr: u64,
    /// 0x030
    pub parent: u64,
    /// 0x038: vector of child element pointers (stride 8)
    pub children: ForeignVec,
    _pad1: [u8; 0x40],
    /// 0x090: position relative to the parent, in design-space units
    pub relative_pos: PackedVec2,
    /// 0x098: size in design-space units, before any scaling
    pub unscaled_size: PackedVec2,
    /// 0x0a0: extra offset applied when [`FLAG_POSITION_MODIFIER`] is set
    pub position_modifier: PackedVec2,
    _pad2: [u8; 4],
    /// 0x0ac
    pub local_scale: f32,
    /// 0x0b0: 0 = width-relative, 1 = height-relative, 2 = min, else free
    pub scale_index: u8,
    _pad3: [u8; 3],
    /// 0x0b4
    pub flags: u32,
}

unsafe impl FromMemory for UiElementFrame {}

impl UiElementFrame {
    pub fn is_visible(&self) -> bool {
        self.flags & FLAG_VISIBLE != 0
    }

    pub fn wants_position_modifier(&self) -> bool {
        self.flags & FLAG_POSITION_MODIFIER != 0
    }
}

/// The atlas panel element with its two data vectors.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct AtlasPanel {
    pub frame: UiElementFrame,
    _pad0: [u8; 0x510 - 0xb8],
    /// 0x510: vector of [`AtlasNodeEntry`]
    pub nodes: ForeignVec,
    /// 0x528: vector of [`AtlasConnectionRecord`]
    pub connections: ForeignVec,
}

unsafe impl FromMemory for AtlasPanel {}

/// One entry of the panel's node vector (stride 32).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug)]
pub struct AtlasNodeEntry {
    pub grid: GridPos,
    /// Address of the node's [`AtlasNodeRecord`]; null entries are skipped.
    pub element: u64,
    pub unknown: u64,
    _pad: u64,
}

unsafe impl FromMemory for AtlasNodeEntry {}

/// One entry of the panel's connection vector (stride 40). Zero or
/// self-valued neighbor slots mean "no connection".
#[repr(C, packed)]
#[derive(Clone, Copy, Debug)]
pub struct AtlasConnectionRecord {
    pub grid: GridPos,
    pub neighbors: [GridPos; 4],
}

unsafe impl FromMemory for AtlasConnectionRecord {}

/// Accessible-now bit of [`AtlasNodeRecord::state`].
pub const NODE_ACCESSIBLE: u16 = 0x0001;
/// Completed bit of [`AtlasNodeRecord::state`].
pub const NODE_COMPLETED: u16 = 0x0002;

/// Indirection from the name object to its UTF-16 text buffer.
pub const NAME_BUFFER_OFFSET: u64 = 0x8;
/// Fixed capacity of the name buffer, in UTF-16 code units.
pub const NAME_MAX_CHARS: usize = 64;

/// The UI element behind a node entry, reinterpreted as an atlas node.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct AtlasNodeRecord {
    pub frame: UiElementFrame,
    _pad0: [u8; 0x270 - 0xb8],
    /// 0x270: name object; text buffer sits behind one more pointer hop
    pub name_ptr: u64,
    /// 0x278: vector of content object pointers (stride 8); each object
    /// uses the same name indirection as `name_ptr`
    pub contents: ForeignVec,
    /// 0x290
    pub state: u16,
}

unsafe impl FromMemory for AtlasNodeRecord {}

impl AtlasNodeRecord {
    pub fn is_accessible(&self) -> bool {
        self.state & NODE_ACCESSIBLE != 0
    }

    pub fn is_completed(&self) -> bool {
        self.state & NODE_COMPLETED != 0
    }

    /// Resolve the display name: one pointer hop from the name object,
    /// then a fixed-capacity UTF-16 buffer. Empty when anything along the
    /// way is null or unreadable.
    pub fn read_name(&self, reader: &RemoteReader) -> String {
        let name_ptr = self.name_ptr;
        if name_ptr == 0 {
            return String::new();
        }
        let buffer: u64 = reader.read(name_ptr.wrapping_add(NAME_BUFFER_OFFSET));
        reader.read_wide_string(buffer, NAME_MAX_CHARS)
    }

    /// Content labels attached to the node (bosses, shrines, and the
    /// like). Each vector slot points at a name object, resolved the same
    /// way as [`Self::read_name`]; null or unreadable slots are dropped.
    pub fn read_labels(&self, reader: &RemoteReader) -> Vec<String> {
        let contents = self.contents;
        let count = contents.count::<u64>();
        let mut labels = Vec::with_capacity(count);
        for i in 0..count {
            let object = contents.pointer_at(reader, i);
            if object == 0 {
                continue;
            }
            let buffer: u64 = reader.read(object.wrapping_add(NAME_BUFFER_OFFSET));
            let label = reader.read_wide_string(buffer, NAME_MAX_CHARS);
            if !label.is_empty() {
                labels.push(label);
            }
        }
        labels
    }
}

// Layout contract with the foreign binary.
const _: () = {
    assert!(mem::size_of::<UiElementFrame>() == 0xb8);
    assert!(mem::size_of::<AtlasPanel>() == 0x540);
    assert!(mem::size_of::<AtlasNodeEntry>() == 32);
    assert!(mem::size_of::<AtlasConnectionRecord>() == 40);
    assert!(mem::size_of::<AtlasNodeRecord>() == 0x292);
};
